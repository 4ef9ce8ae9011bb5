/// Shared application state for the webserver
///
/// Handed to every route handler through axum's `State` extractor.
use crate::config::ServerConfig;
use crate::hub::DistributionHub;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Distribution hub every session registers with
    pub hub: Arc<DistributionHub>,

    /// Server shutdown token; each session runs on a child of it
    pub shutdown: CancellationToken,

    /// Server startup time
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, hub: Arc<DistributionHub>, shutdown: CancellationToken) -> Self {
        Self {
            config: Arc::new(config),
            hub,
            shutdown,
            startup_time: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        (Utc::now() - self.startup_time).num_seconds().max(0) as u64
    }
}
