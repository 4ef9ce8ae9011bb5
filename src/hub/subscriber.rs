/// Hub-side subscriber handle
///
/// The hub only ever talks to a subscriber through `Notifier::try_notify`,
/// a non-blocking enqueue. Dropping the `Subscriber` drops its notifier,
/// which closes the delivery queue and lets the session drain and exit.
use crate::events::Event;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Subscriber ID (unique per hub, monotonically assigned)
pub type SubscriberId = u64;

/// Receiving half of a subscriber's delivery queue
pub type DeliveryReceiver = mpsc::Receiver<Arc<Event>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// Queue is at capacity; the subscriber is not keeping up
    Full,
    /// Receiving side is gone
    Closed,
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::Full => f.write_str("queue full"),
            NotifyError::Closed => f.write_str("queue closed"),
        }
    }
}

/// Non-blocking delivery capability
pub trait Notifier: Send + Sync {
    fn try_notify(&self, event: &Arc<Event>) -> Result<(), NotifyError>;
}

impl Notifier for mpsc::Sender<Arc<Event>> {
    fn try_notify(&self, event: &Arc<Event>) -> Result<(), NotifyError> {
        self.try_send(event.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NotifyError::Full,
            mpsc::error::TrySendError::Closed(_) => NotifyError::Closed,
        })
    }
}

pub struct Subscriber {
    id: SubscriberId,
    notifier: Box<dyn Notifier>,
}

impl Subscriber {
    pub fn new(id: SubscriberId, notifier: impl Notifier + 'static) -> Self {
        Self {
            id,
            notifier: Box::new(notifier),
        }
    }

    /// Subscriber backed by a fresh bounded queue
    pub fn with_queue(id: SubscriberId, capacity: usize) -> (Self, DeliveryReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(id, tx), rx)
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn try_notify(&self, event: &Arc<Event>) -> Result<(), NotifyError> {
        self.notifier.try_notify(event)
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}
