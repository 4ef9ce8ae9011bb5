/// Configuration loading
///
/// Reads a TOML file (defaults when the file is missing) and validates it.
/// Each run mode receives its own section by value.
use super::schemas::Config;
use crate::errors::ConfigError;
use crate::logger::{self, LogTag};
use std::path::Path;

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Read and validate a configuration file
///
/// A missing file is not an error: the defaults are used and a warning is logged.
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let config = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        toml::from_str::<Config>(&contents).map_err(|source| ConfigError::Parse {
            path: display.clone(),
            source,
        })?
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", display),
        );
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_path(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nws_path = \"/events\"\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.server.ws_path, "/events");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nws_path = \"no-slash\"").unwrap();
        assert!(matches!(
            load_config_from_path(file.path()),
            Err(ConfigError::Invalid { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\naddr = ").unwrap();
        assert!(matches!(
            load_config_from_path(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
