/// Duplicate filter in front of the persistence sink
///
/// An id is admitted at most once per process. It is recorded as seen
/// *before* the save is attempted and stays seen if the save fails, so a
/// failed save is never retried by a redelivery (`PersistFailed`).
use crate::database::EventSink;
use crate::events::Event;
use crate::logger::{self, LogTag};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Persisted,
    Duplicate,
    PersistFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub received: u64,
    pub duplicates: u64,
    pub persisted: u64,
    pub failed: u64,
}

pub struct DuplicateFilter {
    seen: Mutex<HashSet<String>>,
    sink: Arc<dyn EventSink>,
    received: AtomicU64,
    duplicates: AtomicU64,
    persisted: AtomicU64,
    failed: AtomicU64,
}

impl DuplicateFilter {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
            sink,
            received: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            persisted: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Admit a new event to the sink, discard a repeat
    pub async fn process_event(&self, event: Event) -> ProcessOutcome {
        self.received.fetch_add(1, Ordering::Relaxed);

        let is_new = self.seen.lock().insert(event.id.clone());
        if !is_new {
            self.duplicates.fetch_add(1, Ordering::Relaxed);
            logger::debug(
                LogTag::Dedup,
                &format!("Duplicate event {} discarded", event.id),
            );
            return ProcessOutcome::Duplicate;
        }

        match self.sink.save(&event).await {
            Ok(()) => {
                self.persisted.fetch_add(1, Ordering::Relaxed);
                logger::info(LogTag::Dedup, &format!("Saved event {}", event));
                ProcessOutcome::Persisted
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                logger::error(
                    LogTag::Dedup,
                    &format!("Failed to persist event {}: {}", event.id, e),
                );
                ProcessOutcome::PersistFailed
            }
        }
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.lock().contains(id)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn stats(&self) -> FilterStats {
        FilterStats {
            received: self.received.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
