/// WebSocket upgrade endpoint
///
/// Every upgraded connection becomes one hub subscriber with its own bounded
/// delivery queue, served by a subscriber session until either side ends it.
use std::sync::Arc;

use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
    routing::get,
    Router,
};
use futures::StreamExt;

use crate::{
    logger::{self, LogTag},
    webserver::{
        session::{run_session, SessionConfig},
        state::AppState,
    },
};

/// Create the upgrade route at `path`
pub fn routes(path: &str) -> Router<Arc<AppState>> {
    Router::new().route(path, get(ws_handler))
}

/// GET <ws_path> - upgrade to WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    let max_message_bytes = state.config.max_message_bytes;

    ws.max_message_size(max_message_bytes)
        .max_frame_size(max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (id, queue) = state.hub.subscribe();
    logger::info(
        LogTag::Webserver,
        &format!(
            "Subscriber {} connected (active={})",
            id,
            state.hub.active_subscribers()
        ),
    );

    let (sink, stream) = socket.split();

    run_session(
        state.hub.clone(),
        id,
        queue,
        sink,
        stream,
        SessionConfig::from_server_config(&state.config),
        state.shutdown.child_token(),
    )
    .await;

    logger::info(
        LogTag::Webserver,
        &format!(
            "Subscriber {} disconnected (active={})",
            id,
            state.hub.active_subscribers()
        ),
    );
}
