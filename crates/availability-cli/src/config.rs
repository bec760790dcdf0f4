//! Optional TOML configuration for the `availabilities` CLI.
//!
//! ```toml
//! [engine]
//! number_of_days = 14
//! timezone = "Europe/Paris"
//!
//! [log]
//! filter = "availability_engine=debug"
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file,
//! and `RUST_LOG` takes precedence over `log.filter`.

use std::path::Path;

use anyhow::{Context, Result};
use availability_engine::EngineConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub engine: EngineConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl CliConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CliConfig = toml::from_str(content)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    #[test]
    fn empty_file_uses_defaults() {
        let config = CliConfig::from_toml("").unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn sections_are_read() {
        let config = CliConfig::from_toml(
            r#"
            [engine]
            number_of_days = 14
            timezone = "Europe/Paris"

            [log]
            filter = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.number_of_days, 14);
        assert_eq!(config.engine.timezone, Tz::Europe__Paris);
        assert_eq!(config.log.filter, "debug");
    }

    #[test]
    fn partial_engine_section_keeps_other_defaults() {
        let config = CliConfig::from_toml("[engine]\ntimezone = \"Asia/Tokyo\"\n").unwrap();
        assert_eq!(config.engine.number_of_days, 7);
        assert_eq!(config.engine.timezone, Tz::Asia__Tokyo);
    }

    #[test]
    fn zero_days_is_rejected() {
        assert!(CliConfig::from_toml("[engine]\nnumber_of_days = 0\n").is_err());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert!(CliConfig::from_toml("[engine]\ntimezone = \"Mars/Olympus\"\n").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CliConfig::from_toml("[engine]\nslot_minutes = 15\n").is_err());
    }
}
