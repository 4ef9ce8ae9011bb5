/// Process orchestration for the `server` and `client` subcommands
///
/// Library errors are typed (`crate::errors`); from here up everything is
/// `anyhow::Result` with context, and only startup failures are fatal.
use anyhow::Context;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, ServerConfig};
use crate::database::{EventSink, SqliteEventStore};
use crate::events::EventClock;
use crate::hub::DistributionHub;
use crate::logger::{self, LogTag};
use crate::subscriber::{Backoff, DuplicateFilter, ReconnectingSubscriber, WsConnector};
use crate::webserver::{self, AppState};

// =============================================================================
// SERVER
// =============================================================================

/// Run the hub until a shutdown signal arrives
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let hub = DistributionHub::new(config.queue_capacity);
    let event_interval = config.event_interval();
    let shutdown_timeout = config.shutdown_timeout();

    // Bind before starting anything else so a busy port fails fast
    let listener = webserver::bind_listener(&config.addr).await?;
    let state = Arc::new(AppState::new(config, hub.clone(), shutdown.clone()));

    let clock = tokio::spawn(EventClock::new(event_interval).run(hub.clone(), shutdown.clone()));
    let mut server = tokio::spawn(webserver::serve(listener, state));

    tokio::select! {
        signal = wait_for_shutdown_signal() => signal?,
        result = &mut server => {
            // Server ended on its own: treat as fatal
            shutdown.cancel();
            hub.close_all();
            return result.context("Webserver task failed")?;
        }
    }

    logger::info(LogTag::System, "Shutting down server...");
    shutdown.cancel();
    hub.close_all();

    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => logger::error(LogTag::Webserver, &format!("Webserver error: {:#}", e)),
        Ok(Err(e)) => logger::error(LogTag::Webserver, &format!("Webserver task failed: {}", e)),
        Err(_) => logger::warning(
            LogTag::Webserver,
            &format!("Webserver did not stop within {:?}", shutdown_timeout),
        ),
    }
    if let Err(e) = clock.await {
        logger::error(LogTag::Clock, &format!("Event clock task failed: {}", e));
    }

    let metrics = hub.metrics().snapshot();
    logger::info(
        LogTag::System,
        &format!(
            "Server stopped (subscribers={}, broadcasts={}, delivered={}, evicted={})",
            metrics.total_subscribers,
            metrics.total_broadcasts,
            metrics.total_delivered,
            metrics.evicted_slow + metrics.evicted_closed
        ),
    );
    Ok(())
}

// =============================================================================
// CLIENT
// =============================================================================

/// Run `num_clients` subscribers sharing one filter and store
pub async fn run_client(config: ClientConfig) -> anyhow::Result<()> {
    let store = Arc::new(
        SqliteEventStore::open(&config.db_path)
            .with_context(|| format!("Failed to open database '{}'", config.db_path))?,
    );
    store
        .init()
        .await
        .context("Failed to initialize event store")?;

    let filter = Arc::new(DuplicateFilter::new(store.clone()));
    let cancel = CancellationToken::new();

    logger::info(
        LogTag::System,
        &format!(
            "Starting {} client(s) against {}",
            config.num_clients, config.server_url
        ),
    );

    let mut clients = JoinSet::new();
    for n in 1..=config.num_clients {
        let name = format!("client-{}", n);
        let mut subscriber = ReconnectingSubscriber::new(
            name,
            WsConnector::new(config.server_url.clone()),
            Backoff::new(config.backoff_base(), config.backoff_max()),
            filter.clone(),
        );
        let cancel = cancel.clone();
        clients.spawn(async move { subscriber.listen(cancel).await });
    }

    wait_for_shutdown_signal().await?;
    logger::info(
        LogTag::System,
        "Shutdown signal received, waiting for clients to stop...",
    );
    cancel.cancel();

    let grace = config.shutdown_grace();
    match tokio::time::timeout(grace, drain(&mut clients)).await {
        Ok(()) => logger::info(LogTag::System, "All clients stopped gracefully"),
        Err(_) => {
            logger::warning(
                LogTag::System,
                &format!("Timeout waiting for clients shutdown ({:?})", grace),
            );
            clients.abort_all();
        }
    }

    let stats = filter.stats();
    logger::info(
        LogTag::System,
        &format!(
            "Client stopped (received={}, duplicates={}, persisted={}, failed={}, stored={})",
            stats.received,
            stats.duplicates,
            stats.persisted,
            stats.failed,
            store.count_events().unwrap_or(0)
        ),
    );
    Ok(())
}

async fn drain(clients: &mut JoinSet<()>) {
    while let Some(result) = clients.join_next().await {
        if let Err(e) = result {
            logger::error(LogTag::Subscriber, &format!("Client task failed: {}", e));
        }
    }
}

// =============================================================================
// SIGNALS
// =============================================================================

/// Wait for SIGINT / SIGTERM (Ctrl+C on Windows)
///
/// A second Ctrl+C during graceful shutdown exits immediately.
async fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    logger::info(
        LogTag::System,
        "Waiting for shutdown signal (press Ctrl+C twice to force kill)",
    );

    #[cfg(unix)]
    let signal_name = {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).context("Failed to bind SIGINT")?;
        let mut sigterm = signal(SignalKind::terminate()).context("Failed to bind SIGTERM")?;

        tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        }
    };

    #[cfg(windows)]
    let signal_name = {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        "CTRL_C"
    };

    logger::warning(
        LogTag::System,
        &format!(
            "Shutdown signal received ({}). Press Ctrl+C again to force kill.",
            signal_name
        ),
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger::error(
                LogTag::System,
                "Second Ctrl+C detected, forcing immediate exit.",
            );
            logger::flush();
            // 130 is the conventional exit code for SIGINT
            std::process::exit(130);
        }
    });

    Ok(())
}
