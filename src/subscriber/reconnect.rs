/// Reconnecting subscriber - client connection lifecycle
///
/// One task owns the subscriber: its connection, state and backoff live in
/// plain fields and are only touched through `&mut self`, so two reconnects
/// can never run at once. A failed read is just a value returned into the
/// listen loop, which then runs the reconnect procedure itself.
///
/// State flow:
/// `Disconnected → Connecting → Connected → Reconnecting → Connecting → …`,
/// with `ShuttingDown` terminal.
use super::backoff::Backoff;
use super::dedup::DuplicateFilter;
use super::transport::{Connector, EventSource};
use crate::errors::ConnectionError;
use crate::events::Event;
use crate::logger::{self, LogTag};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    ShuttingDown,
}

impl fmt::Display for SubscriberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubscriberState::Disconnected => "disconnected",
            SubscriberState::Connecting => "connecting",
            SubscriberState::Connected => "connected",
            SubscriberState::Reconnecting => "reconnecting",
            SubscriberState::ShuttingDown => "shutting_down",
        };
        f.write_str(name)
    }
}

pub struct ReconnectingSubscriber<C: Connector> {
    name: String,
    connector: C,
    connection: Option<C::Connection>,
    state: SubscriberState,
    backoff: Backoff,
    filter: Arc<DuplicateFilter>,
}

impl<C: Connector> ReconnectingSubscriber<C> {
    pub fn new(
        name: impl Into<String>,
        connector: C,
        backoff: Backoff,
        filter: Arc<DuplicateFilter>,
    ) -> Self {
        Self {
            name: name.into(),
            connector,
            connection: None,
            state: SubscriberState::Disconnected,
            backoff,
            filter,
        }
    }

    pub fn state(&self) -> SubscriberState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Dial the hub once
    pub async fn connect(&mut self) -> Result<(), ConnectionError> {
        self.state = SubscriberState::Connecting;

        match self.connector.connect().await {
            Ok(connection) => {
                self.connection = Some(connection);
                self.backoff.reset();
                self.state = SubscriberState::Connected;
                logger::info(
                    LogTag::Subscriber,
                    &format!("[{}] Connected to {}", self.name, self.connector.endpoint()),
                );
                Ok(())
            }
            Err(e) => {
                self.state = SubscriberState::Disconnected;
                Err(e)
            }
        }
    }

    /// Re-establish the connection, backing off between attempts
    ///
    /// Returns false if cancellation fired first; no attempt is made after
    /// that point.
    pub async fn reconnect(&mut self, cancel: &CancellationToken) -> bool {
        self.state = SubscriberState::Reconnecting;
        if let Some(mut stale) = self.connection.take() {
            stale.close().await;
        }

        loop {
            if cancel.is_cancelled() {
                self.state = SubscriberState::ShuttingDown;
                return false;
            }

            let attempt = tokio::select! {
                _ = cancel.cancelled() => None,
                result = self.connect() => Some(result),
            };

            let error = match attempt {
                Some(Ok(())) => return true,
                Some(Err(e)) => e,
                None => {
                    self.state = SubscriberState::ShuttingDown;
                    return false;
                }
            };

            let delay = self.backoff.next_delay();
            self.state = SubscriberState::Reconnecting;
            let message = format!(
                "[{}] Connection failed: {} (retrying in {:?})",
                self.name, error, delay
            );
            if error.is_permanent() {
                // Retried anyway; it only clears once the endpoint is fixed
                logger::error(LogTag::Subscriber, &message);
            } else {
                logger::warning(LogTag::Subscriber, &message);
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    self.state = SubscriberState::ShuttingDown;
                    return false;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Receive events until `cancel` fires
    ///
    /// Also performs the initial connection: with no connection yet the
    /// reconnect procedure runs straight away.
    pub async fn listen(&mut self, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                break;
            }

            if self.connection.is_none() {
                if !self.reconnect(&cancel).await {
                    break;
                }
                continue;
            }
            let Some(connection) = self.connection.as_mut() else {
                continue;
            };

            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = connection.read_message() => result,
            };

            match result {
                Ok(payload) => match Event::from_json(&payload) {
                    Ok(event) => {
                        logger::debug(
                            LogTag::Subscriber,
                            &format!("[{}] Received event {}", self.name, event.id),
                        );
                        self.filter.process_event(event).await;
                    }
                    Err(e) => {
                        logger::warning(
                            LogTag::Subscriber,
                            &format!("[{}] Skipping message: {}", self.name, e),
                        );
                    }
                },
                Err(e) => {
                    logger::warning(
                        LogTag::Subscriber,
                        &format!("[{}] Connection lost: {}", self.name, e),
                    );
                    if !self.reconnect(&cancel).await {
                        break;
                    }
                }
            }
        }

        self.shutdown().await;
    }

    async fn shutdown(&mut self) {
        self.state = SubscriberState::ShuttingDown;
        if let Some(mut connection) = self.connection.take() {
            connection.close().await;
        }
        logger::info(LogTag::Subscriber, &format!("[{}] Stopped", self.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{EventSink, SqliteEventStore};
    use crate::errors::TransportError;
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    enum Attempt {
        Fail,
        /// Serve these payloads, then either hang or report the connection lost
        Serve { frames: Vec<Vec<u8>>, hang: bool },
    }

    /// Connector replaying a script; fails once the script is exhausted
    struct ScriptedConnector {
        script: Mutex<VecDeque<Attempt>>,
        attempts: Arc<AtomicUsize>,
    }

    impl ScriptedConnector {
        fn new(script: Vec<Attempt>) -> (Self, Arc<AtomicUsize>) {
            let attempts = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    script: Mutex::new(script.into()),
                    attempts: attempts.clone(),
                },
                attempts,
            )
        }
    }

    struct ScriptedConnection {
        frames: VecDeque<Vec<u8>>,
        hang: bool,
    }

    #[async_trait]
    impl EventSource for ScriptedConnection {
        async fn read_message(&mut self) -> Result<Vec<u8>, TransportError> {
            match self.frames.pop_front() {
                Some(frame) => Ok(frame),
                None if self.hang => std::future::pending().await,
                None => Err(TransportError::Read("connection reset".to_string())),
            }
        }

        async fn close(&mut self) {}
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        type Connection = ScriptedConnection;

        async fn connect(&self) -> Result<ScriptedConnection, ConnectionError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().pop_front();
            match next {
                Some(Attempt::Serve { frames, hang }) => Ok(ScriptedConnection {
                    frames: frames.into(),
                    hang,
                }),
                Some(Attempt::Fail) | None => Err(ConnectionError::Handshake {
                    url: "ws://test/ws".to_string(),
                    reason: "connection refused".to_string(),
                }),
            }
        }

        fn endpoint(&self) -> &str {
            "ws://test/ws"
        }
    }

    async fn filter() -> (Arc<DuplicateFilter>, Arc<SqliteEventStore>) {
        let store = Arc::new(SqliteEventStore::open_in_memory().unwrap());
        store.init().await.unwrap();
        (Arc::new(DuplicateFilter::new(store.clone())), store)
    }

    fn frame(id: &str, message: &str) -> Vec<u8> {
        Event::new(id, "info", message, Utc::now())
            .to_json()
            .unwrap()
            .into_bytes()
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_backs_off_then_resets() {
        let (connector, attempts) = ScriptedConnector::new(vec![
            Attempt::Fail,
            Attempt::Fail,
            Attempt::Fail,
            Attempt::Serve {
                frames: Vec::new(),
                hang: true,
            },
        ]);
        let (filter, _store) = filter().await;
        let mut subscriber =
            ReconnectingSubscriber::new("test", connector, Backoff::default(), filter);
        let cancel = CancellationToken::new();

        let start = Instant::now();
        assert!(subscriber.reconnect(&cancel).await);
        let elapsed = start.elapsed();

        // Sleeps of 1s, 2s and 4s between the four attempts
        assert!(elapsed >= Duration::from_secs(7));
        assert!(elapsed < Duration::from_millis(7_100));
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(subscriber.state(), SubscriberState::Connected);
        assert_eq!(subscriber.backoff().current(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff_stops_listen() {
        let (connector, attempts) = ScriptedConnector::new(Vec::new());
        let (filter, _store) = filter().await;
        let mut subscriber =
            ReconnectingSubscriber::new("test", connector, Backoff::default(), filter);
        let cancel = CancellationToken::new();

        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                subscriber.listen(cancel).await;
                subscriber
            })
        };

        // Attempts at t=0 and t=1s; the second backoff sleep runs until t=3s
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        cancel.cancel();

        let subscriber = tokio::time::timeout(Duration::from_millis(10), handle)
            .await
            .expect("listen did not stop promptly")
            .unwrap();
        assert_eq!(subscriber.state(), SubscriberState::ShuttingDown);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listen_filters_and_survives_connection_loss() {
        let (connector, attempts) = ScriptedConnector::new(vec![
            Attempt::Serve {
                frames: vec![
                    frame("1", "first"),
                    frame("1", "first again"),
                    b"{not json".to_vec(),
                    frame("2", "second"),
                ],
                hang: false,
            },
            Attempt::Fail,
            Attempt::Serve {
                frames: vec![frame("2", "replayed"), frame("3", "third")],
                hang: true,
            },
        ]);
        let (filter, store) = filter().await;
        let mut subscriber =
            ReconnectingSubscriber::new("test", connector, Backoff::default(), filter.clone());
        let cancel = CancellationToken::new();

        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                subscriber.listen(cancel).await;
                subscriber
            })
        };

        while store.count_events().unwrap() < 3 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        cancel.cancel();
        let subscriber = handle.await.unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(store.count_events().unwrap(), 3);
        assert_eq!(store.load_event("1").unwrap().unwrap().message, "first");
        assert_eq!(store.load_event("2").unwrap().unwrap().message, "second");
        assert_eq!(filter.stats().duplicates, 2);
        assert_eq!(subscriber.state(), SubscriberState::ShuttingDown);
        assert!(!subscriber.is_connected());
    }
}
