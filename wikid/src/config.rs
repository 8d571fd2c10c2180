// This file is part of the product Wikid.
// SPDX-FileCopyrightText: 2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
}

fn default_app_name() -> String {
    "Wikid".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_workers() -> usize {
    2
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "md".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration after validation. Everything downstream takes this type, so
/// an unvalidated `Config` cannot leak past startup.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads `config.yaml` from the runtime root. A missing file yields the
    /// defaults; a present but malformed file is a hard startup error.
    pub fn load(root: &Path) -> Result<Config, ConfigError> {
        let config_path = root.join("config.yaml");
        if !config_path.is_file() {
            info!(
                "No config file at {}; using defaults",
                config_path.display()
            );
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse '{}': {}",
                config_path.display(),
                e
            ))
        })
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.app.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "app.name must not be empty".to_string(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host must not be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be at least 1".to_string(),
            ));
        }
        let extension = self.storage.extension.trim().trim_start_matches('.');
        if extension.is_empty() || !extension.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(ConfigError::ValidationError(format!(
                "storage.extension must be alphanumeric, got '{}'",
                self.storage.extension
            )));
        }
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "logging.level '{}' is not one of trace/debug/info/warn/error",
                    other
                )));
            }
        }

        let mut server = self.server;
        // Parity with the legacy server: PORT env var overrides the file.
        if let Ok(raw_port) = std::env::var("PORT") {
            match raw_port.trim().parse::<u16>() {
                Ok(port) if port != 0 => server.port = port,
                _ => warn!("Ignoring invalid PORT override '{}'", raw_port),
            }
        }

        Ok(ValidatedConfig {
            app: self.app,
            server,
            storage: StorageConfig {
                extension: extension.to_string(),
            },
            logging: self.logging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn missing_config_file_uses_defaults() {
        let fixture = TestFixtureRoot::new_unique("config-defaults").unwrap();
        let config = Config::load(fixture.path()).unwrap();
        let validated = config.validate().unwrap();
        assert_eq!(validated.app.name, "Wikid");
        assert_eq!(validated.server.port, 5000);
        assert_eq!(validated.storage.extension, "md");
    }

    #[test]
    fn partial_config_file_fills_in_defaults() {
        let fixture = TestFixtureRoot::new_unique("config-partial").unwrap();
        fs::write(
            fixture.path().join("config.yaml"),
            "server:\n  port: 8080\n",
        )
        .unwrap();
        let validated = Config::load(fixture.path()).unwrap().validate().unwrap();
        assert_eq!(validated.server.port, 8080);
        assert_eq!(validated.server.host, "127.0.0.1");
        assert_eq!(validated.storage.extension, "md");
    }

    #[test]
    fn malformed_config_file_is_a_load_error() {
        let fixture = TestFixtureRoot::new_unique("config-malformed").unwrap();
        fs::write(fixture.path().join("config.yaml"), "server: [not, a, map]").unwrap();
        assert!(matches!(
            Config::load(fixture.path()),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let fixture = TestFixtureRoot::new_unique("config-unknown").unwrap();
        fs::write(fixture.path().join("config.yaml"), "databse: postgres\n").unwrap();
        assert!(matches!(
            Config::load(fixture.path()),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.workers = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = Config::default();
        config.storage.extension = "m d".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn validate_normalizes_extension() {
        let mut config = Config::default();
        config.storage.extension = ".txt".to_string();
        let validated = config.validate().unwrap();
        assert_eq!(validated.storage.extension, "txt");
    }
}
