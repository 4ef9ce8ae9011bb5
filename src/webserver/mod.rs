/// HTTP and WebSocket surface of the hub process
///
/// Module structure:
/// - `server` - Bind / serve / graceful shutdown
/// - `routes` - Upgrade endpoint and `/status`
/// - `session` - Per-connection outbound and inbound loops
/// - `state` - Shared handler state
mod server;

pub mod routes;
pub mod session;
pub mod state;

// Public API for starting the webserver
pub use server::{bind_listener, serve};
pub use state::AppState;
