#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for the main library
pub const TRACING_TARGET: &str = "ari_comfy";

/// Tracing target for client operations
pub const TRACING_TARGET_CLIENT: &str = "ari_comfy::client";

/// Tracing target for template operations
pub const TRACING_TARGET_TEMPLATE: &str = "ari_comfy::template";

mod client;
mod config;
mod error;
mod substitute;
mod template;

pub use crate::client::{ComfyClient, ExecutionResult, ImageOutput};
pub use crate::config::ComfyConfig;
pub use crate::error::{Error, Result};
pub use crate::substitute::{Overrides, apply};
pub use crate::template::{SlotPath, TemplateBindings, TemplateStore, WorkflowTemplate};
