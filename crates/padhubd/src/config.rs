use std::path::{Path, PathBuf};
use std::time::Duration;

use padhub_engine::EngineConfig;
use serde::Deserialize;
use thiserror::Error;

/// Config file looked up in the current directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "padhub.yaml";

pub const DEFAULT_INTERVAL_MS: u64 = 33;
pub const DEFAULT_POLL_BUDGET_MS: u64 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("config not found: {0}")]
    ConfigNotFound(String),
    #[error("current directory not set")]
    CurrentDirNotSet,
    #[error("path error: {0}")]
    PathError(#[from] std::io::Error),
    #[error("invalid value for {0}: must be greater than zero")]
    NotPositive(&'static str),
}

/// Daemon settings, read from `padhub.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Poll interval in milliseconds.
    pub interval_ms: u64,
    /// Polls per second; takes precedence over `interval_ms`.
    pub fps: Option<u32>,
    /// Upper bound on the time one poll may spend draining events.
    pub poll_budget_ms: u64,
    pub sdl_joystick_rog_chakram: bool,
    /// Topics to print. Empty prints everything.
    pub topics: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            fps: None,
            poll_budget_ms: DEFAULT_POLL_BUDGET_MS,
            sdl_joystick_rog_chakram: false,
            topics: Vec::new(),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        match self.fps {
            Some(fps) if fps > 0 => Duration::from_millis((1000 / u64::from(fps)).max(1)),
            _ => Duration::from_millis(self.interval_ms),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            rog_chakram: self.sdl_joystick_rog_chakram,
            poll_budget: Duration::from_millis(self.poll_budget_ms),
        }
    }

    /// Applies command-line overrides on top of the file values.
    pub fn apply_overrides(&mut self, interval: Option<u64>, fps: Option<u32>, rog_chakram: bool) {
        if let Some(interval) = interval {
            self.interval_ms = interval;
            self.fps = None;
        }
        if fps.is_some() {
            self.fps = fps;
        }
        self.sdl_joystick_rog_chakram |= rog_chakram;
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::NotPositive("interval_ms"));
        }
        if self.fps == Some(0) {
            return Err(ConfigError::NotPositive("fps"));
        }
        if self.poll_budget_ms == 0 {
            return Err(ConfigError::NotPositive("poll_budget_ms"));
        }
        Ok(())
    }
}

/// Parse yaml config. An empty document yields the defaults.
pub fn parse_config(input: &str) -> Result<Config, ConfigError> {
    if input.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(input)?;
    config.validate()?;
    Ok(config)
}

/// Loads the config at `path`, or `padhub.yaml` in the current directory.
///
/// A missing default file is not an error; a missing explicit one is.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (default_config_path()?, false),
    };
    if !path.exists() {
        if explicit {
            return Err(ConfigError::ConfigNotFound(path.display().to_string()));
        }
        return Ok(Config::default());
    }
    let input = std::fs::read_to_string(&path)?;
    parse_config(&input)
}

fn default_config_path() -> Result<PathBuf, ConfigError> {
    std::env::current_dir()
        .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
        .map_err(|_| ConfigError::CurrentDirNotSet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(33));
        assert_eq!(config.engine_config(), EngineConfig::default());
    }

    #[test]
    fn parses_all_keys() {
        let yaml = "\
interval_ms: 20
poll_budget_ms: 50
sdl_joystick_rog_chakram: true
topics: [controller-device-added, error]
";
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.interval_ms, 20);
        assert_eq!(config.topics, ["controller-device-added", "error"]);
        let engine = config.engine_config();
        assert!(engine.rog_chakram);
        assert_eq!(engine.poll_budget, Duration::from_millis(50));
    }

    #[test]
    fn fps_overrides_interval() {
        let config = parse_config("interval_ms: 500\nfps: 60\n").unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(16));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(
            parse_config("interval: 10\n"),
            Err(ConfigError::YamlDeserializeError(_))
        ));
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(matches!(
            parse_config("fps: 0\n"),
            Err(ConfigError::NotPositive("fps"))
        ));
        assert!(matches!(
            parse_config("interval_ms: 0\n"),
            Err(ConfigError::NotPositive("interval_ms"))
        ));
    }

    #[test]
    fn cli_interval_replaces_file_fps() {
        let mut config = parse_config("fps: 30\n").unwrap();
        config.apply_overrides(Some(10), None, true);
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert!(config.sdl_joystick_rog_chakram);

        config.apply_overrides(None, Some(50), false);
        assert_eq!(config.poll_interval(), Duration::from_millis(20));
        assert!(config.sdl_joystick_rog_chakram);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = Path::new("/nonexistent/padhub.yaml");
        assert!(matches!(
            load_config(Some(path)),
            Err(ConfigError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn explicit_file_is_read() {
        let path = std::env::temp_dir().join(format!("padhub-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "poll_budget_ms: 250\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.poll_budget_ms, 250);
    }
}
