//! Chat relay handler.
//!
//! `POST /chat` forwards a prompt to the LLM runtime's text-generation
//! endpoint and returns its response. One synchronous round trip, no
//! retries, no streaming.

use axum::Router;
use axum::extract::State;
use axum::routing::post;

use ari_ollama::OllamaClient;

use crate::Result;
use crate::handler::request::ChatRequest;
use crate::handler::response::ChatResponse;
use crate::service::ServiceState;

/// Tracing target for chat relay operations.
const TRACING_TARGET: &str = "ari_server::handler::chat";

#[tracing::instrument(skip_all, fields(model = request.model.as_deref().unwrap_or("<default>")))]
async fn chat(
    State(ollama_client): State<OllamaClient>,
    axum::Json(request): axum::Json<ChatRequest>,
) -> Result<axum::Json<ChatResponse>> {
    tracing::debug!(
        target: TRACING_TARGET,
        prompt_len = request.prompt.len(),
        "Relaying chat prompt"
    );

    let completion = ollama_client
        .complete(&request.prompt, request.model.as_deref())
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        model = %completion.model,
        response_len = completion.text.len(),
        "Chat prompt relayed"
    );

    Ok(axum::Json(ChatResponse {
        model: completion.model,
        text: completion.text,
    }))
}

/// Returns a [`Router`] with the chat relay route.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/chat", post(chat))
}
