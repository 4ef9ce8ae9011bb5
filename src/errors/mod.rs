/// Error types for EventSync
///
/// One enum per failure domain. None of these is fatal to a running process:
/// connection errors feed the reconnect loop, transport errors tear down a
/// single session, decode errors skip a message and storage errors are logged
/// by the duplicate filter. Only `ConfigError` (and startup storage errors)
/// stop the process, before any core component runs.
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// CONNECTION (dial / handshake)
// =============================================================================

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Handshake with {url} failed: {reason}")]
    Handshake { url: String, reason: String },
}

// =============================================================================
// TRANSPORT (per-connection read / write)
// =============================================================================

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Read error: {0}")]
    Read(String),

    #[error("Write error: {0}")]
    Write(String),

    #[error("No frame received within {0:?}")]
    ReadTimeout(Duration),

    #[error("Write did not complete within {0:?}")]
    WriteTimeout(Duration),

    #[error("Connection closed by peer")]
    Closed,
}

// =============================================================================
// DECODE (wire payload)
// =============================================================================

#[derive(Error, Debug)]
#[error("Malformed event payload: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

// =============================================================================
// STORAGE (persistence sink)
// =============================================================================

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to open event store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to initialize event store: {0}")]
    Init(#[source] rusqlite::Error),

    #[error("Failed to save event {id}: {source}")]
    Save {
        id: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Event store query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config field '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl ConnectionError {
    /// Reconnect treats every connection error as retryable; this only
    /// distinguishes errors that will keep failing until the config changes.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ConnectionError::InvalidUrl { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConnectionError::Handshake {
            url: "ws://localhost:1/ws".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Handshake with ws://localhost:1/ws failed: connection refused"
        );
        assert!(!err.is_permanent());

        let err = ConfigError::invalid("server.ws_path", "must start with '/'");
        assert_eq!(
            err.to_string(),
            "Invalid config field 'server.ws_path': must start with '/'"
        );

        let err = TransportError::ReadTimeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "No frame received within 60s");
    }

    #[test]
    fn test_decode_error_wraps_serde() {
        let err: DecodeError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("Malformed event payload"));
    }
}
