//! Error types for ari-comfy.

use thiserror::Error;

/// Error type for the ari-comfy library.
#[derive(Error, Debug)]
pub enum Error {
    /// A workflow template (or its sidecar) does not exist.
    #[error("Workflow not found: {0}")]
    NotFound(String),

    /// A template or sidecar exists but is not well-formed JSON.
    #[error("Workflow parse error: {0}")]
    Parse(String),

    /// A mandatory substitution target is missing.
    #[error("Missing workflow input: {0}")]
    MissingInput(String),

    /// The ComfyUI server could not be reached.
    #[error("ComfyUI unreachable: {0}")]
    Unavailable(#[source] reqwest::Error),

    /// The job did not reach a terminal state before the deadline.
    #[error("ComfyUI job timed out after {elapsed_secs}s (prompt_id: {prompt_id})")]
    Timeout { prompt_id: String, elapsed_secs: u64 },

    /// The server reported a node-level execution failure.
    #[error("ComfyUI execution error: {0}")]
    Execution(String),

    /// The response body could not be decoded.
    #[error("Invalid ComfyUI response: {0}")]
    InvalidResponse(String),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<Error> for ari_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(message) => ari_core::Error::not_found(message),
            Error::Parse(message) => ari_core::Error::parse(message),
            Error::MissingInput(message) => ari_core::Error::missing_input(message),
            Error::Unavailable(source) => {
                ari_core::Error::unavailable("comfyui", source.to_string()).with_source(source)
            }
            Error::Timeout {
                prompt_id,
                elapsed_secs,
            } => ari_core::Error::timeout(
                "comfyui",
                format!("job {prompt_id} did not finish within {elapsed_secs}s"),
            ),
            Error::Execution(message) => ari_core::Error::execution("comfyui", message),
            Error::InvalidResponse(message) => ari_core::Error::unavailable("comfyui", message),
            Error::Config(message) => ari_core::Error::config(message),
        }
    }
}

/// Result type alias for ari-comfy operations.
pub type Result<T> = std::result::Result<T, Error>;
