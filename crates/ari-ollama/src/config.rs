//! Ollama client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Configuration for the Ollama client.
///
/// This configuration is used to connect to a local or remote Ollama
/// server and to pick the model used when a request does not name one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct OllamaConfig {
    /// Ollama server host (e.g., "localhost" or "192.168.1.100")
    #[cfg_attr(
        feature = "config",
        arg(long = "ollama-host", env = "OLLAMA_HOST", default_value = "127.0.0.1")
    )]
    #[serde(default = "default_host")]
    pub ollama_host: String,

    /// Ollama server port
    #[cfg_attr(
        feature = "config",
        arg(long = "ollama-port", env = "OLLAMA_PORT", default_value_t = 11434)
    )]
    #[serde(default = "default_port")]
    pub ollama_port: u16,

    /// Model used when a chat request does not name one
    #[cfg_attr(
        feature = "config",
        arg(
            long = "ollama-model",
            env = "OLLAMA_MODEL",
            default_value = "miramax"
        )
    )]
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Completion request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "ollama-timeout-secs",
            env = "OLLAMA_TIMEOUT_SECS",
            default_value_t = 120
        )
    )]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    11434
}

fn default_model() -> String {
    "miramax".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            ollama_host: default_host(),
            ollama_port: default_port(),
            default_model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OllamaConfig {
    /// Create a new configuration with host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            ollama_host: host.into(),
            ollama_port: port,
            ..Self::default()
        }
    }

    /// Returns the full URL for the Ollama server.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.ollama_host, self.ollama_port)
    }

    /// Returns the completion timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Set the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.ollama_host = host.into();
        self
    }

    /// Set the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.ollama_port = port;
        self
    }

    /// Set the default model.
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OllamaConfig::default();
        assert_eq!(config.ollama_host, "127.0.0.1");
        assert_eq!(config.ollama_port, 11434);
        assert_eq!(config.default_model, "miramax");
        assert_eq!(config.url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn test_new_config() {
        let config = OllamaConfig::new("192.168.1.100", 8080);
        assert_eq!(config.ollama_host, "192.168.1.100");
        assert_eq!(config.ollama_port, 8080);
        assert_eq!(config.url(), "http://192.168.1.100:8080");
    }

    #[test]
    fn test_builder_pattern() {
        let config = OllamaConfig::default()
            .with_host("remote-server")
            .with_port(9999)
            .with_default_model("llama3");

        assert_eq!(config.ollama_host, "remote-server");
        assert_eq!(config.ollama_port, 9999);
        assert_eq!(config.default_model, "llama3");
    }
}
