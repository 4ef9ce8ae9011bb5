/// Persistence boundary for received events
pub mod events;

pub use events::SqliteEventStore;

use crate::errors::StorageError;
use crate::events::Event;
use async_trait::async_trait;

/// Durable event sink
///
/// Both operations are idempotent: `init` may run on every start and `save`
/// inserts only if no event with the same id is stored.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn init(&self) -> Result<(), StorageError>;

    async fn save(&self, event: &Event) -> Result<(), StorageError>;
}
