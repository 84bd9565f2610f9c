use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".mentor-gateway";

/// Prefix for environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "MENTOR_GATEWAY_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid port: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("Invalid gateway base_url: {0:?}. Must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Gateway model cannot be empty")]
    EmptyModel,

    #[error("Invalid caller credential header name: {0:?}")]
    InvalidCallerHeader(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .mentor-gateway/config.yaml
    /// 3. .mentor-gateway/local.yaml (optional local overrides)
    /// 4. Environment variables (MENTOR_GATEWAY_* prefix)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same precedence as [`ConfigLoader::load`], rooted at `dir`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment overrides still apply on top of the file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort(config.server.port));
        }

        let base_url = config.gateway.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(config.gateway.base_url.clone()));
        }

        if config.gateway.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        let header = &config.gateway.caller_credential_header;
        if reqwest::header::HeaderName::from_bytes(header.as_bytes()).is_err() {
            return Err(ConfigError::InvalidCallerHeader(header.clone()));
        }
        if header.eq_ignore_ascii_case("authorization") {
            return Err(ConfigError::ValidationFailed(
                "caller_credential_header must not replace the gateway Authorization header"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    use crate::domain::models::PersonaVariant;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.gateway.model, "google/gemini-2.5-flash");
        assert_eq!(config.logging.level, "info");
        assert!(!config.gateway.forward_caller_credential);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
server:
  port: 9000
gateway:
  base_url: http://localhost:4000
  model: test-model
logging:
  level: debug
  format: pretty
personas:
  notes: Write terse bullet notes only.
exams:
  jee_main: 2027-01-22
  neet: 2027-05-02
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.gateway.base_url, "http://localhost:4000");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(
            config.personas.get(&PersonaVariant::Notes).map(String::as_str),
            Some("Write terse bullet notes only.")
        );
        assert_eq!(
            config.exams.get("neet"),
            Some(&NaiveDate::from_ymd_opt(2027, 5, 2).unwrap())
        );

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(_)
        ));
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidPort(0)
        ));
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let mut config = Config::default();
        config.gateway.base_url = "ai.gateway.example".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidBaseUrl(_)
        ));
    }

    #[test]
    fn test_validate_empty_model() {
        let mut config = Config::default();
        config.gateway.model = "  ".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyModel
        ));
    }

    #[test]
    fn test_validate_caller_header() {
        let mut config = Config::default();
        config.gateway.caller_credential_header = "bad header".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidCallerHeader(_)
        ));

        config.gateway.caller_credential_header = "Authorization".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ValidationFailed(_)
        ));
    }

    #[test]
    fn test_hierarchical_merging() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "server:\n  port: 9100\nlogging:\n  level: info\n  format: json\n",
        )
        .unwrap();
        fs::write(dir.path().join("local.yaml"), "logging:\n  level: debug\n").unwrap();

        let config = temp_env::with_vars_unset(
            ["MENTOR_GATEWAY_SERVER__PORT", "MENTOR_GATEWAY_LOGGING__LEVEL"],
            || ConfigLoader::load_from_dir(dir.path()).unwrap(),
        );

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.logging.level, "debug", "local.yaml should win");
        assert_eq!(config.logging.format, "json", "base value should persist");
    }

    #[test]
    fn test_env_override() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yaml"), "server:\n  port: 9100\n").unwrap();

        let config = temp_env::with_vars(
            [
                ("MENTOR_GATEWAY_SERVER__PORT", Some("9200")),
                ("MENTOR_GATEWAY_GATEWAY__MODEL", Some("env-model")),
            ],
            || ConfigLoader::load_from_dir(dir.path()).unwrap(),
        );

        assert_eq!(config.server.port, 9200);
        assert_eq!(config.gateway.model, "env-model");
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigLoader::load_from_file(dir.path().join("nope.yaml")).is_err());
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "logging:\n  level: chatty\n").unwrap();

        let err = temp_env::with_var_unset("MENTOR_GATEWAY_LOGGING__LEVEL", || {
            ConfigLoader::load_from_file(&path).unwrap_err()
        });
        assert!(err.to_string().contains("chatty"));
    }
}
