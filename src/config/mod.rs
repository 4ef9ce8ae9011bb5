/// Configuration system
///
/// TOML-backed configuration with every field defaulted via `config_struct!`.
pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{ClientConfig, Config, LoggingConfig, ServerConfig};
pub use utils::{load_config_from_path, CONFIG_FILE_PATH};
