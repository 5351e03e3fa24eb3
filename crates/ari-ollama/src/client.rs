//! Ollama client implementation.
//!
//! This module provides the client interface for the Ollama text-generation
//! API. It handles request/response processing and maps transport failures
//! to the gateway error taxonomy.

use reqwest::{Client as HttpClient, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{Error, OllamaConfig, Result, TRACING_TARGET_CLIENT};

/// A completed text-generation round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The model that produced the response.
    pub model: String,
    /// The generated text.
    pub text: String,
}

/// Wire request for `POST /api/generate`.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Wire response for `POST /api/generate` (non-streaming).
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Wire shape of an Ollama error body, e.g. `{"error": "model not found"}`.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

/// Ollama client for the gateway's chat relay.
///
/// The client performs a single synchronous (awaited) round trip per
/// completion. It does not retry and does not stream.
///
/// # Examples
///
/// ```rust,no_run
/// use ari_ollama::{OllamaClient, OllamaConfig};
///
/// # async fn example() -> ari_ollama::Result<()> {
/// let client = OllamaClient::new(OllamaConfig::default())?;
/// let completion = client.complete("Hi Ari", None).await?;
/// println!("{}", completion.text);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http_client: HttpClient,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a new Ollama client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created. The upstream
    /// server is not contacted; use [`OllamaClient::health_check`] for that.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = %config.url(),
            default_model = %config.default_model,
            "Creating Ollama client"
        );

        let http_client = ClientBuilder::new()
            .timeout(config.timeout())
            .build()
            .map_err(Error::Unavailable)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Returns the model a request resolves to when it names none.
    pub fn resolve_model<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.config.default_model)
    }

    /// Perform a health check against the Ollama service.
    ///
    /// This method verifies that the service is accessible and responding.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.config.url());

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Error::Unavailable)?;

        if response.status().is_success() {
            tracing::debug!(
                target: TRACING_TARGET_CLIENT,
                status = response.status().as_u16(),
                "Health check successful"
            );
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                status,
                message,
                "Health check failed"
            );

            Err(Error::Api { status, message })
        }
    }

    /// Forward a prompt to the runtime's text-generation endpoint.
    ///
    /// When `model` is `None` the configured default model is used.
    ///
    /// # Errors
    ///
    /// - [`Error::Unavailable`] when the server cannot be reached
    /// - [`Error::ModelNotLoaded`] when the runtime has not pulled the model
    /// - [`Error::Api`] for any other non-success status
    pub async fn complete(&self, prompt: &str, model: Option<&str>) -> Result<Completion> {
        let model = self.resolve_model(model);
        let url = format!("{}/api/generate", self.config.url());

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %model,
            prompt_len = prompt.len(),
            "Sending completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(Error::Unavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.map_error_status(status, response, model).await);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %model,
            response_len = body.response.len(),
            "Completion request finished"
        );

        Ok(Completion {
            model: model.to_string(),
            text: body.response,
        })
    }

    /// Maps a non-success completion status to a library error.
    ///
    /// Ollama reports a missing model as `404 {"error": "model ... not found"}`.
    async fn map_error_status(
        &self,
        status: StatusCode,
        response: reqwest::Response,
        model: &str,
    ) -> Error {
        let message = match response.json::<ApiError>().await {
            Ok(body) => body.error,
            Err(_) => "Unknown error".to_string(),
        };

        tracing::warn!(
            target: TRACING_TARGET_CLIENT,
            status = status.as_u16(),
            model = %model,
            message = %message,
            "Completion request failed"
        );

        if status == StatusCode::NOT_FOUND {
            Error::ModelNotLoaded(model.to_string())
        } else {
            Error::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use serde_json::json;

    use super::*;

    /// Serves a stub Ollama API on an ephemeral local port.
    async fn spawn_stub(router: axum::Router) -> anyhow::Result<u16> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        Ok(port)
    }

    fn client_for(port: u16) -> OllamaClient {
        OllamaClient::new(OllamaConfig::new("127.0.0.1", port)).unwrap()
    }

    #[tokio::test]
    async fn complete_returns_upstream_text() -> anyhow::Result<()> {
        let router = axum::Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({"response": "Hello!", "done": true})) }),
        );
        let port = spawn_stub(router).await?;

        let completion = client_for(port).complete("Hi Ari", Some("miramax")).await?;
        assert_eq!(completion.text, "Hello!");
        assert_eq!(completion.model, "miramax");
        Ok(())
    }

    #[tokio::test]
    async fn complete_defaults_model_from_config() -> anyhow::Result<()> {
        let router = axum::Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({"response": "ok"})) }),
        );
        let port = spawn_stub(router).await?;

        let completion = client_for(port).complete("Hi", None).await?;
        assert_eq!(completion.model, "miramax");
        Ok(())
    }

    #[tokio::test]
    async fn missing_model_maps_to_model_not_loaded() -> anyhow::Result<()> {
        let router = axum::Router::new().route(
            "/api/generate",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": "model 'ghost' not found"})),
                )
            }),
        );
        let port = spawn_stub(router).await?;

        let err = client_for(port)
            .complete("Hi", Some("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ModelNotLoaded(_)));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_unavailable() {
        // Nothing is listening on this port.
        let client = client_for(1);
        let err = client.complete("Hi", None).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));

        let core: ari_core::Error = err.into();
        assert_eq!(core.kind(), ari_core::ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn health_check_hits_tags_endpoint() -> anyhow::Result<()> {
        let router = axum::Router::new().route(
            "/api/tags",
            get(|| async { Json(json!({"models": []})) }),
        );
        let port = spawn_stub(router).await?;

        client_for(port).health_check().await?;
        Ok(())
    }
}
