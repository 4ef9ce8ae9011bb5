/// SQLite event store
///
/// Idempotent persistence for received events: one row per id, first write
/// wins (`INSERT OR IGNORE`). A single connection behind a mutex is plenty
/// for the subscriber's write rate; statements never await while holding it.
use super::EventSink;
use crate::errors::StorageError;
use crate::events::Event;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

// =============================================================================
// CONSTANTS
// =============================================================================

const BUSY_TIMEOUT: Duration = Duration::from_millis(30_000);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    type TEXT NOT NULL,
    message TEXT NOT NULL,
    timestamp TEXT NOT NULL
);
";

// =============================================================================
// STORE
// =============================================================================

pub struct SqliteEventStore {
    conn: Mutex<Connection>,
    database_path: String,
}

impl SqliteEventStore {
    /// Open (or create) the database file, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let database_path = path.to_string_lossy().to_string();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: database_path.clone(),
            source,
        })?;
        Self::configure(&conn).map_err(|source| StorageError::Open {
            path: database_path.clone(),
            source,
        })?;

        logger::info(
            LogTag::Storage,
            &format!("Opened event store at {}", database_path),
        );

        Ok(Self {
            conn: Mutex::new(conn),
            database_path,
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::Open {
            path: ":memory:".to_string(),
            source,
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
            database_path: ":memory:".to_string(),
        })
    }

    fn configure(conn: &Connection) -> rusqlite::Result<()> {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        logger::debug(LogTag::Storage, &format!("journal_mode={}", mode));
        Ok(())
    }

    pub fn database_path(&self) -> &str {
        &self.database_path
    }

    pub fn count_events(&self) -> Result<u64, StorageError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    pub fn load_event(&self, id: &str) -> Result<Option<Event>, StorageError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT id, type, message, timestamp FROM events WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, kind, message, timestamp)) = row else {
            return Ok(None);
        };

        // Rows are only written by `save`, so an unparsable timestamp means
        // the file was edited externally; surface it as a conversion failure.
        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| {
                StorageError::Query(rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                ))
            })?
            .with_timezone(&Utc);

        Ok(Some(Event {
            id,
            kind,
            message,
            timestamp,
        }))
    }
}

#[async_trait]
impl EventSink for SqliteEventStore {
    async fn init(&self) -> Result<(), StorageError> {
        self.conn
            .lock()
            .execute_batch(SCHEMA)
            .map_err(StorageError::Init)
    }

    async fn save(&self, event: &Event) -> Result<(), StorageError> {
        let inserted = self
            .conn
            .lock()
            .execute(
                "INSERT OR IGNORE INTO events (id, type, message, timestamp) VALUES (?1, ?2, ?3, ?4)",
                params![
                    event.id,
                    event.kind,
                    event.message,
                    event.timestamp.to_rfc3339()
                ],
            )
            .map_err(|source| StorageError::Save {
                id: event.id.clone(),
                source,
            })?;

        if inserted == 0 {
            logger::debug(
                LogTag::Storage,
                &format!("Event {} already stored, row left unchanged", event.id),
            );
        }
        Ok(())
    }
}
