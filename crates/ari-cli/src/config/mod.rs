//! CLI configuration management.
//!
//! The complete configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig    # Bind address, shutdown timeout
//! ├── ollama: OllamaConfig    # LLM runtime address, default model
//! ├── comfy: ComfyConfig      # Image server address, polling behavior
//! └── gateway: GatewayConfig  # Workflow dir, default workflow, fallback prompt
//! ```
//!
//! Every option can be provided as a CLI argument or an environment
//! variable. Use `--help` to see them all.

mod server;

use std::process;

use anyhow::Context;
use ari_comfy::ComfyConfig;
use ari_ollama::OllamaConfig;
use ari_server::service::GatewayConfig;
use clap::Parser;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "ari")]
#[command(about = "HTTP gateway for the Ari pod services")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// LLM runtime connection and default model.
    #[clap(flatten)]
    pub ollama: OllamaConfig,

    /// Image server connection and polling behavior.
    #[clap(flatten)]
    pub comfy: ComfyConfig,

    /// Workflow templates and fallback prompt.
    #[clap(flatten)]
    pub gateway: GatewayConfig,

    /// Skip the startup readiness probes against the upstream services
    #[arg(long = "skip-readiness", env = "SKIP_READINESS", default_value_t = false)]
    #[serde(default)]
    pub skip_readiness: bool,
}

impl Cli {
    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        Ok(())
    }

    /// Logs configuration at startup (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            ollama_url = %self.ollama.url(),
            default_model = %self.ollama.default_model,
            comfy_url = %self.comfy.url(),
            poll_interval_ms = self.comfy.poll_interval_ms,
            job_timeout_secs = self.comfy.job_timeout_secs,
            workflow_dir = %self.gateway.workflow_dir.display(),
            default_workflow = %self.gateway.default_workflow,
            fallback_prompt_path = %self.gateway.fallback_prompt_path.display(),
            "Upstream configuration"
        );
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            "Build information"
        );
    }
}
