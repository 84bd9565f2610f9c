use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::generation::PersonaVariant;

/// Environment variable consulted when `gateway.api_key` is not configured.
pub const API_KEY_ENV: &str = "AI_GATEWAY_API_KEY";

/// Main configuration structure for the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream chat-completion gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Persona instruction overrides keyed by variant
    #[serde(default)]
    pub personas: HashMap<PersonaVariant, String>,

    /// Exam dates keyed by exam name (e.g. `jee_main`, `neet`)
    #[serde(default)]
    pub exams: HashMap<String, NaiveDate>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to attach permissive CORS headers
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8787
}

const fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: default_true(),
        }
    }
}

/// Upstream gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GatewayConfig {
    /// Base URL of the OpenAI-compatible gateway
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; falls back to `AI_GATEWAY_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent upstream
    #[serde(default = "default_model")]
    pub model: String,

    /// Forward the caller's bearer credential upstream
    #[serde(default)]
    pub forward_caller_credential: bool,

    /// Header used when forwarding the caller credential
    #[serde(default = "default_caller_header")]
    pub caller_credential_header: String,
}

fn default_base_url() -> String {
    "https://ai.gateway.lovable.dev".to_string()
}

fn default_model() -> String {
    "google/gemini-2.5-flash".to_string()
}

fn default_caller_header() -> String {
    "x-caller-authorization".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            forward_caller_credential: false,
            caller_credential_header: default_caller_header(),
        }
    }
}

impl GatewayConfig {
    /// API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8787);
        assert!(config.server.enable_cors);
        assert!(!config.gateway.forward_caller_credential);
        assert_eq!(config.logging.format, "json");
        assert!(config.personas.is_empty());
    }

    #[test]
    fn test_api_key_prefers_config_value() {
        let gateway = GatewayConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        temp_env::with_var(API_KEY_ENV, Some("from-env"), || {
            assert_eq!(gateway.resolve_api_key().as_deref(), Some("from-config"));
        });
    }

    #[test]
    fn test_api_key_falls_back_to_env() {
        let gateway = GatewayConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        temp_env::with_var(API_KEY_ENV, Some("from-env"), || {
            assert_eq!(gateway.resolve_api_key().as_deref(), Some("from-env"));
        });
        temp_env::with_var_unset(API_KEY_ENV, || {
            assert!(gateway.resolve_api_key().is_none());
        });
    }
}
