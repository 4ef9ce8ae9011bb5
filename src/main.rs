use clap::Parser;
use eventsync::{
    arguments::{Cli, Command},
    config,
    logger::{self, LogTag},
    run,
};

/// Main entry point for eventsync
///
/// - `eventsync server`: event clock plus WebSocket hub
/// - `eventsync client`: reconnecting subscribers persisting to SQLite
///
/// Configuration comes from `--config` (defaults when missing), then
/// command-line overrides; invalid configuration exits before anything runs.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logger is not initialized yet, so config errors go straight to stderr
    let mut config = match config::load_config_from_path(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    cli.apply_overrides(&mut config);
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    logger::init(cli.logger_config(&config.logging));

    logger::info(
        LogTag::System,
        &format!(
            "eventsync {} starting ({})",
            env!("CARGO_PKG_VERSION"),
            cli.command_name()
        ),
    );
    if !cli.debug.is_empty() {
        logger::info(
            LogTag::System,
            &format!("Debug output enabled for: {}", cli.debug.join(", ")),
        );
    }

    let result = match cli.command {
        Command::Server(_) => run::run_server(config.server).await,
        Command::Client(_) => run::run_client(config.client).await,
    };

    match result {
        Ok(()) => {
            logger::info(LogTag::System, "eventsync stopped");
            logger::flush();
        }
        Err(e) => {
            logger::error(LogTag::System, &format!("eventsync failed: {:#}", e));
            logger::flush();
            std::process::exit(1);
        }
    }
}
