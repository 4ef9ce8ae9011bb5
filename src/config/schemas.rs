/// Configuration schemas - all config structures defined once with defaults
///
/// Each section is declared with `config_struct!`, so any field (or whole
/// section) missing from `config.toml` takes the value written here.
use crate::config_struct;
use crate::errors::ConfigError;
use std::time::Duration;

// ============================================================================
// SERVER CONFIGURATION
// ============================================================================

config_struct! {
    /// Hub process configuration
    pub struct ServerConfig {
        /// Listen address (host:port)
        addr: String = "127.0.0.1:8080".to_string(),

        /// Path of the WebSocket upgrade endpoint
        ws_path: String = "/ws".to_string(),

        /// Per-subscriber delivery queue capacity
        queue_capacity: usize = 256,

        /// Ping interval; must stay below read_timeout_secs
        keepalive_interval_secs: u64 = 54,

        /// Read deadline, refreshed by every inbound frame
        read_timeout_secs: u64 = 60,

        /// Deadline for a single outbound frame
        write_timeout_secs: u64 = 10,

        /// Largest inbound frame accepted from a subscriber
        max_message_bytes: usize = 1024,

        /// Event clock period
        event_interval_secs: u64 = 5,

        /// Upper bound on graceful HTTP shutdown
        shutdown_timeout_secs: u64 = 5,
    }
}

// ============================================================================
// CLIENT CONFIGURATION
// ============================================================================

config_struct! {
    /// Subscriber process configuration
    pub struct ClientConfig {
        /// Hub endpoint
        server_url: String = "ws://127.0.0.1:8080/ws".to_string(),

        /// SQLite database holding persisted events
        db_path: String = "data/client.db".to_string(),

        /// Parallel subscriber instances sharing one filter/sink
        num_clients: usize = 1,

        /// First reconnect delay; also the value backoff resets to
        backoff_base_ms: u64 = 1_000,

        /// Reconnect delay ceiling
        backoff_max_ms: u64 = 30_000,

        /// How long shutdown waits for subscribers before giving up
        shutdown_grace_secs: u64 = 5,
    }
}

// ============================================================================
// LOGGING CONFIGURATION
// ============================================================================

config_struct! {
    /// Logging configuration (CLI flags take precedence)
    pub struct LoggingConfig {
        /// Minimum level: error, warning, info, debug, verbose
        level: String = "info".to_string(),

        /// Modules with debug output enabled (same keys as --debug)
        debug_modules: Vec<String> = Vec::new(),

        /// Optional log file path
        file: Option<String> = None,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration (data/config.toml)
    pub struct Config {
        server: ServerConfig = ServerConfig::default(),
        client: ClientConfig = ClientConfig::default(),
        logging: LoggingConfig = LoggingConfig::default(),
    }
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addr.trim().is_empty() {
            return Err(ConfigError::invalid("server.addr", "cannot be empty"));
        }
        if !self.ws_path.starts_with('/') {
            return Err(ConfigError::invalid("server.ws_path", "must start with '/'"));
        }
        if self.ws_path == "/status" {
            return Err(ConfigError::invalid("server.ws_path", "'/status' is reserved"));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::invalid("server.queue_capacity", "must be > 0"));
        }
        if self.keepalive_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "server.keepalive_interval_secs",
                "must be > 0",
            ));
        }
        if self.keepalive_interval_secs >= self.read_timeout_secs {
            return Err(ConfigError::invalid(
                "server.keepalive_interval_secs",
                format!(
                    "must be less than read_timeout_secs ({} >= {})",
                    self.keepalive_interval_secs, self.read_timeout_secs
                ),
            ));
        }
        if self.write_timeout_secs == 0 {
            return Err(ConfigError::invalid("server.write_timeout_secs", "must be > 0"));
        }
        if self.event_interval_secs == 0 {
            return Err(ConfigError::invalid("server.event_interval_secs", "must be > 0"));
        }
        Ok(())
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn event_interval(&self) -> Duration {
        Duration::from_secs(self.event_interval_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.server_url)
            .map_err(|e| ConfigError::invalid("client.server_url", e.to_string()))?;
        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(ConfigError::invalid(
                "client.server_url",
                format!("scheme must be ws or wss, got '{}'", url.scheme()),
            ));
        }
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::invalid("client.db_path", "cannot be empty"));
        }
        if self.num_clients == 0 {
            return Err(ConfigError::invalid("client.num_clients", "must be > 0"));
        }
        if self.backoff_base_ms == 0 {
            return Err(ConfigError::invalid("client.backoff_base_ms", "must be > 0"));
        }
        if self.backoff_base_ms > self.backoff_max_ms {
            return Err(ConfigError::invalid(
                "client.backoff_base_ms",
                "must not exceed backoff_max_ms",
            ));
        }
        Ok(())
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level
            .parse::<crate::logger::LogLevel>()
            .map(|_| ())
            .map_err(|e| ConfigError::invalid("logging.level", e))
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.client.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.keepalive_interval(), Duration::from_secs(54));
        assert_eq!(config.server.read_timeout(), Duration::from_secs(60));
        assert_eq!(config.client.backoff_base(), Duration::from_secs(1));
        assert_eq!(config.client.backoff_max(), Duration::from_secs(30));
    }

    #[test]
    fn test_keepalive_must_be_shorter_than_read_timeout() {
        let mut server = ServerConfig::default();
        server.keepalive_interval_secs = 60;
        server.read_timeout_secs = 60;
        let err = server.validate().unwrap_err();
        assert!(err.to_string().contains("keepalive_interval_secs"));
    }

    #[test]
    fn test_client_url_scheme_is_checked() {
        let mut client = ClientConfig::default();
        client.server_url = "http://127.0.0.1:8080/ws".to_string();
        assert!(client.validate().is_err());

        client.server_url = "wss://events.example.com/ws".to_string();
        assert!(client.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            addr = "0.0.0.0:9000"

            [client]
            num_clients = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.server.addr, "0.0.0.0:9000");
        assert_eq!(config.server.ws_path, "/ws");
        assert_eq!(config.server.queue_capacity, 256);
        assert_eq!(config.client.num_clients, 4);
        assert_eq!(config.client.db_path, "data/client.db");
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = Config::default();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());
    }
}
