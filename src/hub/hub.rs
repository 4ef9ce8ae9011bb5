/// Distribution hub - live subscriber set and fan-out
///
/// The hub manages:
/// - The live subscriber map (subscriber_id → subscriber)
/// - Non-blocking broadcast to every registered subscriber
/// - Eviction of subscribers whose queue is full or closed
/// - Hub-level metrics
///
/// The map sits behind one `parking_lot::RwLock`. Broadcast takes an
/// upgradable read; upgradable readers exclude each other, so broadcasts are
/// serialized and every subscriber sees events in broadcast order. The lock
/// is only upgraded when a broadcast has someone to evict, and is never held
/// across an await. The active-subscriber gauge is only changed while the
/// write lock is held, so it always matches the map.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::events::Event;
use crate::logger::{self, LogTag};

use super::metrics::HubMetrics;
use super::subscriber::{DeliveryReceiver, NotifyError, Subscriber, SubscriberId};

// ============================================================================
// HUB TYPES
// ============================================================================

/// Outcome of a single broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub evicted: usize,
}

// ============================================================================
// DISTRIBUTION HUB
// ============================================================================

pub struct DistributionHub {
    /// Live subscribers
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,

    /// Next subscriber ID
    next_id: AtomicU64,

    metrics: Arc<HubMetrics>,

    /// Delivery queue capacity for subscribers created by `subscribe`
    queue_capacity: usize,
}

impl DistributionHub {
    pub fn new(queue_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            metrics: HubMetrics::new(),
            queue_capacity,
        })
    }

    /// Allocate a fresh subscriber ID
    pub fn next_subscriber_id(&self) -> SubscriberId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Add a subscriber to the live set
    ///
    /// Registering an ID that is already present replaces the old subscriber
    /// (whose queue is closed when it is dropped here).
    pub fn register(&self, subscriber: Subscriber) {
        let id = subscriber.id();
        let previous = {
            let mut subscribers = self.subscribers.write();
            let previous = subscribers.insert(id, subscriber);
            if previous.is_some() {
                self.metrics.subscribers_removed(1);
            }
            self.metrics.subscriber_added();
            previous
        };

        if previous.is_some() {
            logger::warning(
                LogTag::Hub,
                &format!("Subscriber {} registered twice, replacing", id),
            );
        }

        logger::debug(
            LogTag::Hub,
            &format!(
                "Subscriber {} registered (active={})",
                id,
                self.active_subscribers()
            ),
        );
    }

    /// Create, register and return a subscriber with a fresh bounded queue
    pub fn subscribe(&self) -> (SubscriberId, DeliveryReceiver) {
        let id = self.next_subscriber_id();
        let (subscriber, rx) = Subscriber::with_queue(id, self.queue_capacity);
        self.register(subscriber);
        (id, rx)
    }

    /// Remove a subscriber and close its queue
    ///
    /// Returns false when the subscriber was already gone.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let removed = {
            let mut subscribers = self.subscribers.write();
            let removed = subscribers.remove(&id);
            if removed.is_some() {
                self.metrics.subscribers_removed(1);
            }
            removed
        };

        match removed {
            Some(subscriber) => {
                drop(subscriber);
                logger::debug(
                    LogTag::Hub,
                    &format!(
                        "Subscriber {} unregistered (active={})",
                        id,
                        self.active_subscribers()
                    ),
                );
                true
            }
            None => false,
        }
    }

    /// Offer an event to every subscriber without blocking
    ///
    /// Subscribers whose queue is full or closed are removed before this
    /// returns.
    pub fn broadcast(&self, event: Arc<Event>) -> BroadcastReport {
        let subscribers = self.subscribers.upgradable_read();

        let mut delivered = 0;
        let mut to_evict: Vec<(SubscriberId, NotifyError)> = Vec::new();

        for (id, subscriber) in subscribers.iter() {
            match subscriber.try_notify(&event) {
                Ok(()) => delivered += 1,
                Err(reason) => to_evict.push((*id, reason)),
            }
        }

        let evicted = to_evict.len();
        if evicted > 0 {
            let mut subscribers = RwLockUpgradableReadGuard::upgrade(subscribers);
            for (id, _) in &to_evict {
                subscribers.remove(id);
            }
            self.metrics.subscribers_removed(evicted);
            drop(subscribers);

            for (id, reason) in &to_evict {
                match reason {
                    NotifyError::Full => {
                        self.metrics.evicted_slow();
                        logger::warning(
                            LogTag::Hub,
                            &format!("Evicted slow subscriber {} ({})", id, reason),
                        );
                    }
                    NotifyError::Closed => {
                        self.metrics.evicted_closed();
                        logger::debug(
                            LogTag::Hub,
                            &format!("Removed subscriber {} ({})", id, reason),
                        );
                    }
                }
            }
        } else {
            drop(subscribers);
        }

        self.metrics.broadcast(delivered);

        logger::debug(
            LogTag::Hub,
            &format!(
                "Broadcast event {} (delivered={}, evicted={})",
                event.id, delivered, evicted
            ),
        );

        BroadcastReport { delivered, evicted }
    }

    /// Remove every subscriber, closing all queues
    pub fn close_all(&self) -> usize {
        let drained: Vec<Subscriber> = {
            let mut subscribers = self.subscribers.write();
            let drained: Vec<Subscriber> =
                subscribers.drain().map(|(_, subscriber)| subscriber).collect();
            self.metrics.subscribers_removed(drained.len());
            drained
        };

        let count = drained.len();
        drop(drained);

        if count > 0 {
            logger::info(LogTag::Hub, &format!("Closed {} subscriber(s)", count));
        }
        count
    }

    pub fn active_subscribers(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.read().contains_key(&id)
    }

    pub fn metrics(&self) -> Arc<HubMetrics> {
        self.metrics.clone()
    }
}
