/// Event model and producer
pub mod clock;
pub mod types;

pub use clock::EventClock;
pub use types::{Event, EventKind};
