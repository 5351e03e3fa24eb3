//! ComfyUI client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Configuration for the ComfyUI client.
///
/// Covers the server address and the polling behavior of the execution
/// client. The job deadline is deliberately generous: FLUX-class image
/// jobs on a single GPU routinely run for a minute or more.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ComfyConfig {
    /// ComfyUI server host
    #[cfg_attr(
        feature = "config",
        arg(long = "comfy-host", env = "COMFY_HOST", default_value = "127.0.0.1")
    )]
    #[serde(default = "default_host")]
    pub comfy_host: String,

    /// ComfyUI server port
    #[cfg_attr(
        feature = "config",
        arg(long = "comfy-port", env = "COMFY_PORT", default_value_t = 8188)
    )]
    #[serde(default = "default_port")]
    pub comfy_port: u16,

    /// Interval between history polls, in milliseconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "comfy-poll-interval-ms",
            env = "COMFY_POLL_INTERVAL_MS",
            default_value_t = 500
        )
    )]
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Overall deadline for a queued job, in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "comfy-job-timeout-secs",
            env = "COMFY_JOB_TIMEOUT_SECS",
            default_value_t = 180
        )
    )]
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8188
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_job_timeout_secs() -> u64 {
    180
}

impl Default for ComfyConfig {
    fn default() -> Self {
        Self {
            comfy_host: default_host(),
            comfy_port: default_port(),
            poll_interval_ms: default_poll_interval_ms(),
            job_timeout_secs: default_job_timeout_secs(),
        }
    }
}

impl ComfyConfig {
    /// Create a new configuration with host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            comfy_host: host.into(),
            comfy_port: port,
            ..Self::default()
        }
    }

    /// Returns the full URL for the ComfyUI server.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.comfy_host, self.comfy_port)
    }

    /// Returns the poll interval as a `Duration`.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns the job deadline as a `Duration`.
    #[must_use]
    pub const fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    /// Set the poll interval in milliseconds.
    #[must_use]
    pub fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    /// Set the job deadline in seconds.
    #[must_use]
    pub fn with_job_timeout_secs(mut self, secs: u64) -> Self {
        self.job_timeout_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ComfyConfig::default();
        assert_eq!(config.comfy_host, "127.0.0.1");
        assert_eq!(config.comfy_port, 8188);
        assert_eq!(config.url(), "http://127.0.0.1:8188");
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.job_timeout(), Duration::from_secs(180));
    }

    #[test]
    fn test_builder_pattern() {
        let config = ComfyConfig::new("gpu-node", 9188)
            .with_poll_interval_ms(50)
            .with_job_timeout_secs(5);

        assert_eq!(config.url(), "http://gpu-node:9188");
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.job_timeout(), Duration::from_secs(5));
    }
}
