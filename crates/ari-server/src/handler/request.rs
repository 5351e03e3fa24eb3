//! Request bodies for the gateway endpoints.

use serde::Deserialize;

/// Body of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Prompt forwarded verbatim to the LLM runtime.
    pub prompt: String,
    /// Model to use; the configured default when absent.
    #[serde(default)]
    pub model: Option<String>,
}

/// Body of `POST /generate-image/cc`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateImageRequest {
    /// Workflow template file name; the configured default when absent.
    #[serde(default)]
    pub workflow: Option<String>,
    /// Prompt text; read from the fallback prompt file when absent.
    #[serde(default)]
    pub prompt_text: Option<String>,
    /// Reference image path; the template's own default when absent.
    #[serde(default)]
    pub ref_image_path: Option<String>,
}
