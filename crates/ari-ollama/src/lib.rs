#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for the main library
pub const TRACING_TARGET: &str = "ari_ollama";

/// Tracing target for client operations
pub const TRACING_TARGET_CLIENT: &str = "ari_ollama::client";

mod client;
mod config;
mod error;

pub use crate::client::{Completion, OllamaClient};
pub use crate::config::OllamaConfig;
pub use crate::error::{Error, Result};
