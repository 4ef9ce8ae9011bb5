/// Event distribution hub
///
/// Module structure:
/// - `hub` - Live subscriber set, broadcast and eviction
/// - `subscriber` - Notifier capability and subscriber handle
/// - `metrics` - Hub counters
#[allow(clippy::module_inception)]
pub mod hub;
pub mod metrics;
pub mod subscriber;

pub use hub::{BroadcastReport, DistributionHub};
pub use metrics::{HubMetrics, HubMetricsSnapshot};
pub use subscriber::{DeliveryReceiver, Notifier, NotifyError, Subscriber, SubscriberId};
