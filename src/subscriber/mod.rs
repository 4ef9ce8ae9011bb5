/// Client side: reconnecting, deduplicating subscribers
///
/// Module structure:
/// - `transport` - Connector / EventSource seams and the WebSocket implementation
/// - `backoff` - Capped exponential reconnect delay
/// - `reconnect` - Connection lifecycle state machine
/// - `dedup` - Seen-set filter in front of the event sink
pub mod backoff;
pub mod dedup;
pub mod reconnect;
pub mod transport;

pub use backoff::Backoff;
pub use dedup::{DuplicateFilter, FilterStats, ProcessOutcome};
pub use reconnect::{ReconnectingSubscriber, SubscriberState};
pub use transport::{Connector, EventSource, WsConnection, WsConnector};
