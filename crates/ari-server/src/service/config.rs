//! Gateway-level configuration.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Configuration for the gateway's own concerns: where workflow templates
/// live, where the fallback prompt comes from, and which workflow the
/// image endpoint uses when the request names none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct GatewayConfig {
    /// Directory holding the pre-authored workflow templates
    #[cfg_attr(
        feature = "config",
        arg(
            long = "workflow-dir",
            env = "WORKFLOW_DIR",
            default_value = "/workspace/ComfyUI/workflows"
        )
    )]
    #[serde(default = "default_workflow_dir")]
    pub workflow_dir: PathBuf,

    /// Workflow used when a request does not name one
    #[cfg_attr(
        feature = "config",
        arg(
            long = "default-workflow",
            env = "DEFAULT_WORKFLOW",
            default_value = "sirio_consistency.json"
        )
    )]
    #[serde(default = "default_workflow")]
    pub default_workflow: String,

    /// File read for prompt text when a request supplies none
    #[cfg_attr(
        feature = "config",
        arg(
            long = "fallback-prompt-path",
            env = "FALLBACK_PROMPT_PATH",
            default_value = "/workspace/prompts/default_prompt.txt"
        )
    )]
    #[serde(default = "default_fallback_prompt_path")]
    pub fallback_prompt_path: PathBuf,
}

fn default_workflow_dir() -> PathBuf {
    PathBuf::from("/workspace/ComfyUI/workflows")
}

fn default_workflow() -> String {
    "sirio_consistency.json".to_string()
}

fn default_fallback_prompt_path() -> PathBuf {
    PathBuf::from("/workspace/prompts/default_prompt.txt")
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            workflow_dir: default_workflow_dir(),
            default_workflow: default_workflow(),
            fallback_prompt_path: default_fallback_prompt_path(),
        }
    }
}

impl GatewayConfig {
    /// Set the workflow template directory.
    #[must_use]
    pub fn with_workflow_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workflow_dir = dir.into();
        self
    }

    /// Set the default workflow name.
    #[must_use]
    pub fn with_default_workflow(mut self, name: impl Into<String>) -> Self {
        self.default_workflow = name.into();
        self
    }

    /// Set the fallback prompt file path.
    #[must_use]
    pub fn with_fallback_prompt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_prompt_path = path.into();
        self
    }
}
