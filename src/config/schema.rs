//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the attack-log server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Debug (`dev`) or production (`prod`) posture.
    pub mode: ServerMode,

    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Capacities of the in-memory request logs.
    pub logs: LogsConfig,

    /// Outbound forwarding settings. Hot-reloadable.
    pub forward: ForwardConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Server posture.
///
/// `Dev` mounts the log dashboards and adds diagnostic detail to error
/// payloads. `Prod` serves only the demo pages and the API endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    #[default]
    Dev,
    Prod,
}

impl ServerMode {
    pub fn is_dev(self) -> bool {
        matches!(self, ServerMode::Dev)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServerMode::Dev => "dev",
            ServerMode::Prod => "prod",
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,

    /// Maximum request body buffered for capture, in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Capacities of the two bounded logs.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogsConfig {
    /// Entries retained in the full request log.
    pub request_capacity: usize,

    /// Entries retained in the attack-only log.
    pub attack_capacity: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            request_capacity: 100,
            attack_capacity: 50,
        }
    }
}

/// Forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ForwardConfig {
    /// Target host used when the payload carries no `Host` header.
    pub default_host: String,

    /// Deadline for the single outbound call, in milliseconds.
    pub timeout_ms: u64,

    /// Characters of the remote body echoed back to the caller.
    pub preview_chars: usize,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            default_host: "127.0.0.1".to_string(),
            timeout_ms: 5_000,
            preview_chars: 200,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_log_capacities() {
        let config = AppConfig::default();
        assert_eq!(config.mode, ServerMode::Dev);
        assert_eq!(config.logs.request_capacity, 100);
        assert_eq!(config.logs.attack_capacity, 50);
        assert_eq!(config.forward.default_host, "127.0.0.1");
        assert_eq!(config.forward.preview_chars, 200);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            mode = "prod"

            [forward]
            timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, ServerMode::Prod);
        assert_eq!(config.forward.timeout_ms, 250);
        assert_eq!(config.forward.preview_chars, 200);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8081");
    }

    #[test]
    fn test_log_format_is_lowercase() {
        let config: ObservabilityConfig = toml::from_str(r#"log_format = "json""#).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
