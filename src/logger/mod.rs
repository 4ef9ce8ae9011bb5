//! Structured logging for EventSync
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via `--debug <module>` flags
//! - Colored console output plus an optional plain-text log file
//!
//! ## Usage
//!
//! ```rust
//! use eventsync::logger::{self, LogTag};
//!
//! logger::error(LogTag::Storage, "Failed to open event store");
//! logger::warning(LogTag::Hub, "Evicted slow subscriber 7");
//! logger::info(LogTag::Subscriber, "Connected to ws://127.0.0.1:8080/ws");
//! logger::debug(LogTag::Dedup, "Duplicate event filtered"); // Only with --debug dedup
//! logger::verbose(LogTag::Session, "Ping sent"); // Only with --verbose
//! ```
//!
//! ## Initialization
//!
//! Call once at startup, after the CLI and config have been parsed:
//! ```rust,ignore
//! logger::init(cli.logger_config(&config.logging));
//! ```
//! Without `init` the defaults apply (INFO threshold, console only), which is
//! what tests rely on.

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::LoggerConfig;
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// Installs the configuration and opens the log file if one is configured.
pub fn init(config: LoggerConfig) {
    config::set_logger_config(config);
    file::init_file_logging();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (shown unless --quiet)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level
///
/// Only shown when `--debug <module>` names this tag (or `--debug all`).
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (only with --verbose)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Force flush pending file writes
///
/// Call this during shutdown to ensure all logs reach disk.
pub fn flush() {
    file::flush_file_logging();
}
