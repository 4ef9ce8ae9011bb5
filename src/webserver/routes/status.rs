use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    hub::HubMetricsSnapshot,
    logger::{self, LogTag},
    webserver::state::AppState,
};

/// Hub status response
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_subscribers: usize,
    pub hub: HubMetricsSnapshot,
}

/// Create status routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(hub_status))
}

/// GET /status
async fn hub_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    logger::debug(LogTag::Webserver, "Status endpoint called");

    Json(StatusResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_secs(),
        active_subscribers: state.hub.active_subscribers(),
        hub: state.hub.metrics().snapshot(),
    })
}
