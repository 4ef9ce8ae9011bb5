/// Core logging implementation with automatic filtering
///
/// Decides whether a message is shown based on level and tag, then hands it
/// to the format module for console and file output.
use super::config::{with_logger_config, LoggerConfig};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Check if a log message should be displayed
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Anything above the minimum level threshold is dropped
/// 3. Debug requires the debug flag for that tag (or `all`)
/// 4. Verbose requires `--verbose` (threshold at Verbose) or a per-tag verbose flag
/// 5. If enabled_tags is non-empty, the tag must be in the set
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    with_logger_config(|config| passes_filters(config, tag, level))
}

fn passes_filters(config: &LoggerConfig, tag: &LogTag, level: LogLevel) -> bool {
    match level {
        LogLevel::Error => true,
        LogLevel::Debug => {
            config.debug_enabled_for(tag) || config.min_level >= LogLevel::Verbose
        }
        LogLevel::Verbose => {
            config.min_level == LogLevel::Verbose || config.verbose_enabled_for(tag)
        }
        _ if level > config.min_level => false,
        _ => config.enabled_tags.is_empty() || config.enabled_tags.contains(&tag.to_debug_key()),
    }
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(&tag, level, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only exercises the default configuration; other tests must not rely on
    // mutating the global logger state.
    #[test]
    fn test_default_filtering() {
        assert!(should_log(&LogTag::Hub, LogLevel::Error));
        assert!(should_log(&LogTag::Hub, LogLevel::Warning));
        assert!(should_log(&LogTag::Hub, LogLevel::Info));
        assert!(!should_log(&LogTag::Hub, LogLevel::Verbose));
    }

    #[test]
    fn test_filters_with_explicit_config() {
        let mut config = LoggerConfig {
            min_level: LogLevel::Warning,
            ..LoggerConfig::default()
        };
        config.debug_tags.insert("hub".to_string());

        assert!(passes_filters(&config, &LogTag::Hub, LogLevel::Warning));
        assert!(!passes_filters(&config, &LogTag::Hub, LogLevel::Info));
        assert!(passes_filters(&config, &LogTag::Hub, LogLevel::Debug));
        assert!(!passes_filters(&config, &LogTag::Session, LogLevel::Debug));

        config.enabled_tags.insert("session".to_string());
        assert!(!passes_filters(&config, &LogTag::Hub, LogLevel::Warning));
        assert!(passes_filters(&config, &LogTag::Session, LogLevel::Warning));

        config.debug_tags.insert("all".to_string());
        assert!(passes_filters(&config, &LogTag::Storage, LogLevel::Debug));
    }
}
