/// Logger configuration and global state
///
/// The configuration lives in a process-wide `RwLock`. Until `set_logger_config`
/// is called (tests, library use) the defaults apply: INFO threshold, console only.
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level shown (Debug/Verbose still need their per-tag gates)
    pub min_level: LogLevel,

    /// Tags with debug output enabled (`--debug <module>`)
    pub debug_tags: HashSet<String>,

    /// Tags with verbose output enabled
    pub verbose_tags: HashSet<String>,

    /// If non-empty, only these tags are shown (errors always pass)
    pub enabled_tags: HashSet<String>,

    /// Optional plain-text log file
    pub file_path: Option<PathBuf>,

    /// Write to stdout
    pub console: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
            file_path: None,
            console: true,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Snapshot of the active logger configuration
pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

/// Replace the active logger configuration
pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Run a closure against the active configuration without cloning it
pub fn with_logger_config<F, R>(f: F) -> R
where
    F: FnOnce(&LoggerConfig) -> R,
{
    f(&LOGGER_CONFIG.read())
}

impl LoggerConfig {
    pub fn debug_enabled_for(&self, tag: &LogTag) -> bool {
        self.debug_tags.contains("all") || self.debug_tags.contains(&tag.to_debug_key())
    }

    pub fn verbose_enabled_for(&self, tag: &LogTag) -> bool {
        self.verbose_tags.contains(&tag.to_debug_key())
    }
}
