/// Axum webserver implementation
///
/// Server lifecycle: bind, serve until the shutdown token fires, then let
/// in-flight HTTP requests finish. WebSocket sessions watch child tokens of
/// the same shutdown token and close themselves.
use anyhow::{anyhow, Context};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::{
    logger::{self, LogTag},
    webserver::{routes, state::AppState},
};

/// Bind the listen address with a helpful error for common failures
pub async fn bind_listener(addr: &str) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", addr))?;

    TcpListener::bind(&addr).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => anyhow!(
            "Failed to bind to {}: Address already in use\n\
             \n\
             Another eventsync server (or another program) is listening on this port.\n\
             Stop it, or pick another address with --addr.",
            addr
        ),
        std::io::ErrorKind::PermissionDenied => anyhow!(
            "Failed to bind to {}: Permission denied\n\
             \n\
             Port {} requires elevated privileges on this system.\n\
             Consider using a port above 1024 or running with appropriate permissions.",
            addr,
            addr.port()
        ),
        _ => anyhow!("Failed to bind to {}: {}", addr, e),
    })
}

/// Serve on an already bound listener until `state.shutdown` is cancelled
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    let local_addr = listener.local_addr().context("Listener has no local address")?;
    let shutdown = state.shutdown.clone();
    let ws_path = state.config.ws_path.clone();

    let app = build_app(state);

    logger::info(
        LogTag::Webserver,
        &format!("Listening on http://{} (ws://{}{})", local_addr, local_addr, ws_path),
    );

    let shutdown_signal = async move {
        shutdown.cancelled().await;
        logger::debug(
            LogTag::Webserver,
            "Received shutdown signal, stopping webserver...",
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    logger::info(LogTag::Webserver, "Webserver stopped gracefully");
    Ok(())
}

fn build_app(state: Arc<AppState>) -> Router {
    routes::create_router(state)
}
