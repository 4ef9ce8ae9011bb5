/// Client transport - dialing the hub and reading frames
///
/// `Connector` and `EventSource` are the seams the reconnecting subscriber
/// is written against; `WsConnector` is the tokio-tungstenite implementation.
use crate::errors::{ConnectionError, TransportError};
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Upper bound on the close handshake when shutting a connection down
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// TRAITS
// ============================================================================

/// An open connection delivering raw event payloads
#[async_trait]
pub trait EventSource: Send {
    /// Next data payload; control frames are handled internally
    async fn read_message(&mut self) -> Result<Vec<u8>, TransportError>;

    async fn close(&mut self);
}

/// Something that can open connections to the hub
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: EventSource;

    async fn connect(&self) -> Result<Self::Connection, ConnectionError>;

    /// Target shown in logs
    fn endpoint(&self) -> &str;
}

// ============================================================================
// WEBSOCKET IMPLEMENTATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Connection = WsConnection;

    async fn connect(&self) -> Result<WsConnection, ConnectionError> {
        let url = url::Url::parse(&self.url).map_err(|e| ConnectionError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(ConnectionError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let (stream, _response) =
            connect_async(url.as_str())
                .await
                .map_err(|e| ConnectionError::Handshake {
                    url: self.url.clone(),
                    reason: e.to_string(),
                })?;

        Ok(WsConnection { stream })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl EventSource for WsConnection {
    async fn read_message(&mut self) -> Result<Vec<u8>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.into_bytes()),
                Some(Ok(Message::Binary(data))) => return Ok(data),
                // Pongs to the hub's pings are queued by tungstenite and
                // flushed on the next read
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Frame(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed),
                Some(Err(e)) => return Err(TransportError::Read(e.to_string())),
            }
        }
    }

    async fn close(&mut self) {
        let _ = tokio::time::timeout(CLOSE_TIMEOUT, self.stream.close(None)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_permanent() {
        let err = WsConnector::new("not a url").connect().await.err().unwrap();
        assert!(matches!(err, ConnectionError::InvalidUrl { .. }));
        assert!(err.is_permanent());

        let err = WsConnector::new("http://127.0.0.1:1/ws")
            .connect()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ConnectionError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_refused_connection_is_handshake_error() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = WsConnector::new(format!("ws://127.0.0.1:{}/ws", port))
            .connect()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ConnectionError::Handshake { .. }));
        assert!(!err.is_permanent());
    }

    #[tokio::test]
    async fn test_wss_dial_reaches_tls_handshake() {
        use tokio::io::AsyncWriteExt;

        // A plain-TCP peer: the client gets as far as the TLS handshake and
        // fails there, not on a missing TLS backend
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let peer = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let _ = socket
                .write_all(b"HTTP/1.1 400 Bad Request\r\ncontent-length: 0\r\n\r\n")
                .await;
        });

        let err = WsConnector::new(format!("wss://{}/ws", addr))
            .connect()
            .await
            .err()
            .unwrap();
        peer.await.unwrap();

        match &err {
            ConnectionError::Handshake { reason, .. } => {
                assert!(
                    !reason.contains("TLS support not compiled in"),
                    "unexpected reason: {}",
                    reason
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!err.is_permanent());
    }
}
