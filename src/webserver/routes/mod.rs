use crate::webserver::state::AppState;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod status;
pub mod ws;

/// Build the full router: upgrade endpoint, status endpoint, permissive CORS
pub fn create_router(state: Arc<AppState>) -> Router {
    let ws_path = state.config.ws_path.clone();

    Router::new()
        .merge(ws::routes(&ws_path))
        .merge(status::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
