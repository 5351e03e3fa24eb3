//! Error types for ari-ollama.

use thiserror::Error;

/// Error type for the ari-ollama library.
#[derive(Error, Debug)]
pub enum Error {
    /// The Ollama server could not be reached.
    #[error("Ollama unreachable: {0}")]
    Unavailable(#[source] reqwest::Error),

    /// The requested model is not installed on the runtime.
    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    /// The Ollama API returned a non-success status.
    #[error("Ollama API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Invalid Ollama response: {0}")]
    InvalidResponse(String),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<Error> for ari_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Unavailable(source) => {
                ari_core::Error::unavailable("ollama", source.to_string()).with_source(source)
            }
            Error::ModelNotLoaded(model) => {
                ari_core::Error::model_not_loaded(format!("model is not installed: {model}"))
            }
            Error::Api { status, message } => {
                ari_core::Error::unavailable("ollama", format!("status {status}: {message}"))
            }
            Error::InvalidResponse(message) => ari_core::Error::unavailable("ollama", message),
            Error::Config(message) => ari_core::Error::config(message),
        }
    }
}

/// Result type alias for ari-ollama operations.
pub type Result<T> = std::result::Result<T, Error>;
