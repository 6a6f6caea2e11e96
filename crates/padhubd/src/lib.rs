pub mod config;
pub mod logging;
pub mod sink;

pub use config::{load_config, parse_config, Config, ConfigError, DEFAULT_CONFIG_FILE};
pub use sink::{severity, LogSink, Severity};
