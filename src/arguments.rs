/// Command-line arguments for eventsync
///
/// Features:
/// - `server` / `client` subcommands
/// - Global logging flags (`--debug <module>`, `--verbose`, `--quiet`)
/// - Per-subcommand overrides applied on top of the TOML configuration
use crate::config::{Config, LoggingConfig, CONFIG_FILE_PATH};
use crate::logger::{LogLevel, LoggerConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eventsync")]
#[command(version, about = "Event fan-out hub with reconnecting, deduplicating subscribers", long_about = None)]
pub struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(long, global = true, default_value = CONFIG_FILE_PATH)]
    pub config: PathBuf,

    /// Enable debug output for a module (hub, session, webserver, clock,
    /// subscriber, dedup, storage, config, system, all); repeatable
    #[arg(long = "debug", value_name = "MODULE", global = true)]
    pub debug: Vec<String>,

    /// Show verbose output for every module
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the hub: event clock plus WebSocket endpoint
    Server(ServerArgs),

    /// Run subscriber instances that persist received events
    Client(ClientArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServerArgs {
    /// Listen address (host:port)
    #[arg(long)]
    pub addr: Option<String>,

    /// Path of the WebSocket endpoint
    #[arg(long = "ws-path")]
    pub ws_path: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ClientArgs {
    /// Hub WebSocket URL
    #[arg(long)]
    pub url: Option<String>,

    /// SQLite database path
    #[arg(long)]
    pub db: Option<String>,

    /// Number of parallel subscriber instances
    #[arg(long)]
    pub clients: Option<usize>,
}

impl Cli {
    /// Overlay command-line values on the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        match &self.command {
            Command::Server(args) => {
                if let Some(addr) = &args.addr {
                    config.server.addr = addr.clone();
                }
                if let Some(ws_path) = &args.ws_path {
                    config.server.ws_path = ws_path.clone();
                }
            }
            Command::Client(args) => {
                if let Some(url) = &args.url {
                    config.client.server_url = url.clone();
                }
                if let Some(db) = &args.db {
                    config.client.db_path = db.clone();
                }
                if let Some(clients) = args.clients {
                    config.client.num_clients = clients;
                }
            }
        }
    }

    /// Logger settings: config file first, flags win
    pub fn logger_config(&self, logging: &LoggingConfig) -> LoggerConfig {
        let mut min_level = logging.level.parse().unwrap_or(LogLevel::Info);
        if self.verbose {
            min_level = LogLevel::Verbose;
        } else if self.quiet {
            min_level = LogLevel::Warning;
        }

        let debug_tags = logging
            .debug_modules
            .iter()
            .chain(self.debug.iter())
            .flat_map(|modules| modules.split(','))
            .map(|module| module.trim().to_lowercase())
            .filter(|module| !module.is_empty())
            .collect();

        LoggerConfig {
            min_level,
            debug_tags,
            file_path: logging.file.as_ref().map(PathBuf::from),
            ..LoggerConfig::default()
        }
    }

    pub fn command_name(&self) -> &'static str {
        match self.command {
            Command::Server(_) => "server",
            Command::Client(_) => "client",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_overrides() {
        let cli = Cli::try_parse_from([
            "eventsync",
            "server",
            "--addr",
            "0.0.0.0:9000",
            "--ws-path",
            "/events",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.server.addr, "0.0.0.0:9000");
        assert_eq!(config.server.ws_path, "/events");
        assert_eq!(config.client, Config::default().client);
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE_PATH));
    }

    #[test]
    fn test_client_overrides_and_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "eventsync",
            "client",
            "--url",
            "ws://hub:8080/ws",
            "--clients",
            "3",
            "--debug",
            "dedup",
            "--config",
            "custom.toml",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.client.server_url, "ws://hub:8080/ws");
        assert_eq!(config.client.num_clients, 3);
        assert_eq!(config.client.db_path, "data/client.db");
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.command_name(), "client");
    }

    #[test]
    fn test_logger_config_merges_sources() {
        let cli = Cli::try_parse_from([
            "eventsync",
            "--debug",
            "Hub,session",
            "--quiet",
            "server",
        ])
        .unwrap();
        let logging = LoggingConfig {
            level: "debug".to_string(),
            debug_modules: vec!["storage".to_string()],
            file: Some("logs/eventsync.log".to_string()),
        };

        let config = cli.logger_config(&logging);
        assert_eq!(config.min_level, LogLevel::Warning);
        assert!(config.debug_tags.contains("hub"));
        assert!(config.debug_tags.contains("session"));
        assert!(config.debug_tags.contains("storage"));
        assert_eq!(config.file_path, Some(PathBuf::from("logs/eventsync.log")));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["eventsync", "--verbose", "--quiet", "server"]).is_err());
        assert!(Cli::try_parse_from(["eventsync"]).is_err());
    }
}
