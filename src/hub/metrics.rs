use serde::Serialize;
/// Hub metrics collection
///
/// Lifetime counters for the distribution hub, exposed on `/status`.
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// HUB METRICS
// ============================================================================

/// Hub-level metrics (aggregate across all subscribers)
#[derive(Debug, Default)]
pub struct HubMetrics {
    /// Total subscribers registered (lifetime)
    total_subscribers: AtomicU64,

    /// Currently registered subscribers
    active_subscribers: AtomicUsize,

    /// Broadcast calls
    total_broadcasts: AtomicU64,

    /// Successful enqueues (all subscribers)
    total_delivered: AtomicU64,

    /// Subscribers evicted for a full queue
    evicted_slow: AtomicU64,

    /// Subscribers evicted because their queue was already closed
    evicted_closed: AtomicU64,
}

impl HubMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a registration
    pub fn subscriber_added(&self) {
        self.total_subscribers.fetch_add(1, Ordering::Relaxed);
        self.active_subscribers.fetch_add(1, Ordering::Relaxed);
    }

    /// Record removals (unregister, eviction or close_all)
    pub fn subscribers_removed(&self, count: usize) {
        self.active_subscribers.fetch_sub(count, Ordering::Relaxed);
    }

    /// Record one broadcast and its delivery count
    pub fn broadcast(&self, delivered: usize) {
        self.total_broadcasts.fetch_add(1, Ordering::Relaxed);
        self.total_delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
    }

    pub fn evicted_slow(&self) {
        self.evicted_slow.fetch_add(1, Ordering::Relaxed);
    }

    pub fn evicted_closed(&self) {
        self.evicted_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot for API
    pub fn snapshot(&self) -> HubMetricsSnapshot {
        HubMetricsSnapshot {
            total_subscribers: self.total_subscribers.load(Ordering::Relaxed),
            active_subscribers: self.active_subscribers.load(Ordering::Relaxed),
            total_broadcasts: self.total_broadcasts.load(Ordering::Relaxed),
            total_delivered: self.total_delivered.load(Ordering::Relaxed),
            evicted_slow: self.evicted_slow.load(Ordering::Relaxed),
            evicted_closed: self.evicted_closed.load(Ordering::Relaxed),
        }
    }
}

/// Hub metrics snapshot (serializable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubMetricsSnapshot {
    pub total_subscribers: u64,
    pub active_subscribers: usize,
    pub total_broadcasts: u64,
    pub total_delivered: u64,
    pub evicted_slow: u64,
    pub evicted_closed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_metrics() {
        let metrics = HubMetrics::new();

        metrics.subscriber_added();
        metrics.subscriber_added();
        metrics.subscriber_added();
        metrics.broadcast(3);
        metrics.broadcast(2);
        metrics.evicted_slow();
        metrics.subscribers_removed(1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_subscribers, 3);
        assert_eq!(snapshot.active_subscribers, 2);
        assert_eq!(snapshot.total_broadcasts, 2);
        assert_eq!(snapshot.total_delivered, 5);
        assert_eq!(snapshot.evicted_slow, 1);
        assert_eq!(snapshot.evicted_closed, 0);
    }
}
