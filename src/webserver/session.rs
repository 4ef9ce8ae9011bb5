/// Subscriber session - one WebSocket connection on the hub side
///
/// Each session runs two loops in the connection's task:
/// - outbound: drains the delivery queue into text frames and sends keepalive pings
/// - inbound: reads frames only to prove the peer is alive
///
/// Both loops share a session token (a child of the server shutdown token).
/// Whichever loop ends first cancels it, and once both have stopped the
/// subscriber is unregistered from the hub.
use axum::extract::ws::{close_code, CloseFrame, Message};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::errors::TransportError;
use crate::hub::{DeliveryReceiver, DistributionHub, SubscriberId};
use crate::logger::{self, LogTag};

// ============================================================================
// SESSION CONFIG
// ============================================================================

/// Session timing
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Ping interval (must be shorter than `read_timeout`)
    pub keepalive_interval: Duration,

    /// Longest silence tolerated from the peer
    pub read_timeout: Duration,

    /// Deadline for one outbound frame
    pub write_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_server_config(&ServerConfig::default())
    }
}

impl SessionConfig {
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            keepalive_interval: config.keepalive_interval(),
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        }
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Run a session until either side ends it, then unregister the subscriber
pub async fn run_session<Tx, TxErr, Rx, RxErr>(
    hub: Arc<DistributionHub>,
    id: SubscriberId,
    queue: DeliveryReceiver,
    sink: Tx,
    stream: Rx,
    config: SessionConfig,
    cancel: CancellationToken,
) where
    Tx: Sink<Message, Error = TxErr> + Unpin,
    TxErr: Display,
    Rx: Stream<Item = Result<Message, RxErr>> + Unpin,
    RxErr: Display,
{
    logger::debug(LogTag::Session, &format!("Session {} started", id));

    let (outbound, inbound) = tokio::join!(
        write_loop(id, queue, sink, &config, cancel.clone()),
        read_loop(id, stream, &config, cancel.clone()),
    );

    hub.unregister(id);

    match outbound.and(inbound) {
        Ok(()) => logger::info(LogTag::Session, &format!("Session {} closed", id)),
        Err(e) => logger::warning(
            LogTag::Session,
            &format!("Session {} closed: {}", id, e),
        ),
    }
}

async fn write_loop<Tx, TxErr>(
    id: SubscriberId,
    mut queue: DeliveryReceiver,
    mut sink: Tx,
    config: &SessionConfig,
    cancel: CancellationToken,
) -> Result<(), TransportError>
where
    Tx: Sink<Message, Error = TxErr> + Unpin,
    TxErr: Display,
{
    let _guard = cancel.clone().drop_guard();

    let mut keepalive = interval_at(
        Instant::now() + config.keepalive_interval,
        config.keepalive_interval,
    );
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                return send_close(&mut sink, "session ended", config.write_timeout).await;
            }

            next = queue.recv() => match next {
                Some(event) => {
                    let json = match event.to_json() {
                        Ok(json) => json,
                        Err(e) => {
                            logger::error(
                                LogTag::Session,
                                &format!("Session {}: failed to serialize event {}: {}", id, event.id, e),
                            );
                            continue;
                        }
                    };
                    send_frame(&mut sink, Message::Text(json), config.write_timeout).await?;
                }
                None => {
                    logger::debug(LogTag::Session, &format!("Session {}: delivery queue closed", id));
                    return send_close(&mut sink, "unsubscribed", config.write_timeout).await;
                }
            },

            _ = keepalive.tick() => {
                logger::verbose(LogTag::Session, &format!("Session {}: ping", id));
                send_frame(&mut sink, Message::Ping(Vec::new()), config.write_timeout).await?;
            }
        }
    }
}

async fn read_loop<Rx, RxErr>(
    id: SubscriberId,
    mut stream: Rx,
    config: &SessionConfig,
    cancel: CancellationToken,
) -> Result<(), TransportError>
where
    Rx: Stream<Item = Result<Message, RxErr>> + Unpin,
    RxErr: Display,
{
    let _guard = cancel.clone().drop_guard();

    loop {
        // A fresh deadline per frame: any frame, Pong included, proves liveness
        let next = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            next = timeout(config.read_timeout, stream.next()) => next,
        };

        match next {
            Err(_) => return Err(TransportError::ReadTimeout(config.read_timeout)),
            Ok(None) => return Err(TransportError::Closed),
            Ok(Some(Ok(Message::Close(_)))) => {
                logger::debug(LogTag::Session, &format!("Session {}: peer closed", id));
                return Ok(());
            }
            Ok(Some(Ok(_))) => {
                logger::verbose(LogTag::Session, &format!("Session {}: frame received", id));
            }
            Ok(Some(Err(e))) => return Err(TransportError::Read(e.to_string())),
        }
    }
}

async fn send_frame<Tx, TxErr>(
    sink: &mut Tx,
    message: Message,
    limit: Duration,
) -> Result<(), TransportError>
where
    Tx: Sink<Message, Error = TxErr> + Unpin,
    TxErr: Display,
{
    match timeout(limit, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(TransportError::Write(e.to_string())),
        Err(_) => Err(TransportError::WriteTimeout(limit)),
    }
}

async fn send_close<Tx, TxErr>(
    sink: &mut Tx,
    reason: &'static str,
    limit: Duration,
) -> Result<(), TransportError>
where
    Tx: Sink<Message, Error = TxErr> + Unpin,
    TxErr: Display,
{
    let frame = CloseFrame {
        code: close_code::NORMAL,
        reason: reason.into(),
    };
    send_frame(sink, Message::Close(Some(frame)), limit).await
}
