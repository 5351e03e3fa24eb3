//! Response bodies for the gateway endpoints.

use ari_comfy::ImageOutput;
use serde::Serialize;

/// Body of a successful `GET /healthz`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Liveness marker; always true when the process can respond.
    pub ok: bool,
}

/// Body of a successful `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// The model that produced the response.
    pub model: String,
    /// The generated text.
    pub text: String,
}

/// Body of a successful `POST /generate-image/cc`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateImageResponse {
    /// The server-assigned job id.
    pub prompt_id: String,
    /// Image references reported by the image server, relayed opaquely.
    pub outputs: Vec<ImageOutput>,
}
