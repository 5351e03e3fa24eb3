//! Image-generation handler.
//!
//! `POST /generate-image/cc` loads a pre-authored workflow template,
//! substitutes the request parameters into its declared slots, queues the
//! concrete graph on the image server, and relays the result. The template
//! load happens first: a missing workflow is answered 404 without the
//! image server ever being contacted.

use axum::Router;
use axum::extract::State;
use axum::routing::post;

use ari_comfy::{ComfyClient, Overrides, TemplateStore};
use ari_core::ErrorKind;

use crate::handler::request::GenerateImageRequest;
use crate::handler::response::GenerateImageResponse;
use crate::service::{GatewayConfig, ServiceState};
use crate::{Error, Result};

/// Tracing target for image-generation operations.
const TRACING_TARGET: &str = "ari_server::handler::images";

#[tracing::instrument(skip_all, fields(workflow = request.workflow.as_deref().unwrap_or("<default>")))]
async fn generate_image_cc(
    State(template_store): State<TemplateStore>,
    State(comfy_client): State<ComfyClient>,
    State(gateway_config): State<GatewayConfig>,
    axum::Json(request): axum::Json<GenerateImageRequest>,
) -> Result<axum::Json<GenerateImageResponse>> {
    let workflow = request
        .workflow
        .as_deref()
        .unwrap_or(&gateway_config.default_workflow);

    let template = template_store
        .load(workflow)
        .map_err(|e| Error::from(e).with_resource("workflow"))?;

    let prompt_text = resolve_prompt(request.prompt_text, &gateway_config).await?;

    let mut overrides = Overrides::none().with_prompt_text(prompt_text);
    if let Some(path) = request.ref_image_path {
        overrides = overrides.with_ref_image_path(path);
    }

    let graph = ari_comfy::apply(&template, &overrides)?;

    tracing::debug!(
        target: TRACING_TARGET,
        workflow = %workflow,
        "Submitting concrete graph"
    );

    let result = comfy_client.submit(&graph).await?;

    tracing::info!(
        target: TRACING_TARGET,
        workflow = %workflow,
        prompt_id = %result.prompt_id,
        output_count = result.outputs.len(),
        "Image workflow completed"
    );

    Ok(axum::Json(GenerateImageResponse {
        prompt_id: result.prompt_id,
        outputs: result.outputs,
    }))
}

/// Resolves the prompt text from the request or the fallback prompt file.
async fn resolve_prompt(requested: Option<String>, config: &GatewayConfig) -> Result<String> {
    if let Some(prompt) = requested {
        return Ok(prompt);
    }

    tracing::debug!(
        target: TRACING_TARGET,
        path = %config.fallback_prompt_path.display(),
        "Reading fallback prompt file"
    );

    match tokio::fs::read_to_string(&config.fallback_prompt_path).await {
        Ok(contents) => Ok(contents.trim().to_string()),
        Err(e) => Err(Error::new(
            ErrorKind::MissingInput,
            format!("no prompt text in request and the fallback prompt file is unreadable: {e}"),
        )
        .with_resource("prompt_text")),
    }
}

/// Returns a [`Router`] with the image-generation route.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/generate-image/cc", post(generate_image_cc))
}
