//! ComfyUI execution client.
//!
//! Submits a concrete graph to the server's queue (`POST /prompt`) and
//! polls the job history until the job reaches a terminal state or the
//! configured deadline passes. One submission per call; no retries, no
//! deduplication of identical graphs.

use std::time::Instant;

use reqwest::{Client as HttpClient, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{ComfyConfig, Error, Result, TRACING_TARGET_CLIENT};

/// Wire request for `POST /prompt`.
#[derive(Debug, Serialize)]
struct QueueRequest<'a> {
    prompt: &'a Value,
    client_id: String,
}

/// Wire response for `POST /prompt`.
#[derive(Debug, Deserialize)]
struct QueueResponse {
    prompt_id: String,
}

/// One generated image reference reported by the server.
///
/// The gateway relays these opaquely; fetching the bytes is the caller's
/// business (ComfyUI serves them under `/view`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOutput {
    /// Output file name within the server's output directory.
    pub filename: String,
    /// Subfolder within the output directory.
    #[serde(default)]
    pub subfolder: String,
    /// Output category, e.g. "output" or "temp".
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Terminal result of a queued job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The server-assigned job id.
    pub prompt_id: String,
    /// Image references collected from every output node.
    pub outputs: Vec<ImageOutput>,
}

/// What a history entry says about a job.
enum JobState {
    Finished(Vec<ImageOutput>),
    Failed(String),
    Running,
}

/// ComfyUI client for the gateway's image-generation path.
#[derive(Debug, Clone)]
pub struct ComfyClient {
    http_client: HttpClient,
    config: ComfyConfig,
}

impl ComfyClient {
    /// Create a new ComfyUI client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created. The upstream
    /// server is not contacted; use [`ComfyClient::health_check`] for that.
    pub fn new(config: ComfyConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = %config.url(),
            job_timeout_secs = config.job_timeout_secs,
            "Creating ComfyUI client"
        );

        let http_client = ClientBuilder::new().build().map_err(Error::Unavailable)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ComfyConfig {
        &self.config
    }

    /// Perform a health check against the ComfyUI service.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/system_stats", self.config.url());

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Error::Unavailable)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::InvalidResponse(format!(
                "health check returned status {}",
                response.status().as_u16()
            )))
        }
    }

    /// Submits a concrete graph and waits for the job to finish.
    ///
    /// Blocks (awaits) until the job reaches a terminal state or the
    /// configured deadline passes.
    ///
    /// # Errors
    ///
    /// - [`Error::Unavailable`] when the server cannot be reached
    /// - [`Error::Execution`] when the server rejects the graph or reports
    ///   a node-level failure
    /// - [`Error::Timeout`] when the deadline elapses first
    pub async fn submit(&self, graph: &Value) -> Result<ExecutionResult> {
        let prompt_id = self.queue_prompt(graph).await?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            prompt_id = %prompt_id,
            "Workflow queued"
        );

        self.wait_for_completion(prompt_id).await
    }

    /// Queues a graph, returning the server-assigned prompt id.
    async fn queue_prompt(&self, graph: &Value) -> Result<String> {
        let url = format!("{}/prompt", self.config.url());
        let request = QueueRequest {
            prompt: graph,
            client_id: Uuid::new_v4().to_string(),
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(Error::Unavailable)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                status = status.as_u16(),
                message = %message,
                "Workflow submission rejected"
            );

            return Err(Error::Execution(format!(
                "submission rejected (status {}): {message}",
                status.as_u16()
            )));
        }

        let body: QueueResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        Ok(body.prompt_id)
    }

    /// Polls the job history until a terminal state or the deadline.
    async fn wait_for_completion(&self, prompt_id: String) -> Result<ExecutionResult> {
        let started = Instant::now();
        let deadline = started + self.config.job_timeout();

        loop {
            match self.fetch_job_state(&prompt_id).await? {
                JobState::Finished(outputs) => {
                    tracing::info!(
                        target: TRACING_TARGET_CLIENT,
                        prompt_id = %prompt_id,
                        output_count = outputs.len(),
                        elapsed_ms = started.elapsed().as_millis(),
                        "Workflow finished"
                    );

                    return Ok(ExecutionResult { prompt_id, outputs });
                }
                JobState::Failed(message) => {
                    tracing::warn!(
                        target: TRACING_TARGET_CLIENT,
                        prompt_id = %prompt_id,
                        message = %message,
                        "Workflow failed"
                    );

                    return Err(Error::Execution(message));
                }
                JobState::Running => {}
            }

            if Instant::now() >= deadline {
                return Err(Error::Timeout {
                    prompt_id,
                    elapsed_secs: started.elapsed().as_secs(),
                });
            }

            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    /// Fetches the history entry for a job and classifies it.
    async fn fetch_job_state(&self, prompt_id: &str) -> Result<JobState> {
        let url = format!("{}/history/{prompt_id}", self.config.url());

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Error::Unavailable)?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        // History is keyed by prompt id; no entry means the job is still
        // queued or executing.
        let Some(entry) = body.get(prompt_id) else {
            return Ok(JobState::Running);
        };

        Ok(classify_entry(entry))
    }
}

/// Classifies a history entry as finished, failed, or still running.
fn classify_entry(entry: &Value) -> JobState {
    if let Some(status) = entry.get("status") {
        let status_str = status.get("status_str").and_then(Value::as_str);

        if status_str == Some("error") {
            return JobState::Failed(error_message(status));
        }

        let completed = status
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !completed && status_str != Some("success") {
            return JobState::Running;
        }
    }

    // Entries predating the status block are terminal once outputs exist.
    match entry.get("outputs") {
        Some(outputs) => JobState::Finished(collect_outputs(outputs)),
        None => JobState::Running,
    }
}

/// Pulls a human-readable failure out of a history status block.
fn error_message(status: &Value) -> String {
    let messages = status.get("messages").and_then(Value::as_array);

    messages
        .into_iter()
        .flatten()
        .filter_map(|m| {
            let pair = m.as_array()?;
            if pair.first()?.as_str()? != "execution_error" {
                return None;
            }
            let detail = pair.get(1)?;
            let node = detail.get("node_type").and_then(Value::as_str)?;
            let message = detail.get("exception_message").and_then(Value::as_str)?;
            Some(format!("{node}: {message}"))
        })
        .next()
        .unwrap_or_else(|| "node-level execution failure".to_string())
}

/// Collects image references from every output node.
fn collect_outputs(outputs: &Value) -> Vec<ImageOutput> {
    let Some(nodes) = outputs.as_object() else {
        return Vec::new();
    };

    nodes
        .values()
        .filter_map(|node| node.get("images")?.as_array())
        .flatten()
        .filter_map(|image| serde_json::from_value(image.clone()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use serde_json::json;

    use super::*;

    /// Serves a stub ComfyUI API on an ephemeral local port.
    async fn spawn_stub(router: axum::Router) -> anyhow::Result<u16> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        Ok(port)
    }

    fn client_for(port: u16) -> ComfyClient {
        let config = ComfyConfig::new("127.0.0.1", port)
            .with_poll_interval_ms(10)
            .with_job_timeout_secs(1);
        ComfyClient::new(config).unwrap()
    }

    fn queue_route() -> axum::Router {
        axum::Router::new().route(
            "/prompt",
            post(|| async { Json(json!({"prompt_id": "job-1", "number": 0})) }),
        )
    }

    #[tokio::test]
    async fn submit_returns_outputs_on_success() -> anyhow::Result<()> {
        let history = |Path(id): Path<String>| async move {
            Json(json!({
                id: {
                    "status": {"status_str": "success", "completed": true},
                    "outputs": {
                        "9": {"images": [
                            {"filename": "cc_00001_.png", "subfolder": "", "type": "output"}
                        ]}
                    }
                }
            }))
        };
        let router = queue_route().route("/history/{id}", get(history));
        let port = spawn_stub(router).await?;

        let result = client_for(port).submit(&json!({"nodes": {}})).await?;
        assert_eq!(result.prompt_id, "job-1");
        assert_eq!(result.outputs.len(), 1);
        assert_eq!(result.outputs[0].filename, "cc_00001_.png");
        assert_eq!(result.outputs[0].kind, "output");
        Ok(())
    }

    #[tokio::test]
    async fn node_failure_maps_to_execution_error() -> anyhow::Result<()> {
        let history = |Path(id): Path<String>| async move {
            Json(json!({
                id: {
                    "status": {
                        "status_str": "error",
                        "completed": false,
                        "messages": [["execution_error", {
                            "node_type": "KSampler",
                            "exception_message": "CUDA out of memory"
                        }]]
                    }
                }
            }))
        };
        let router = queue_route().route("/history/{id}", get(history));
        let port = spawn_stub(router).await?;

        let err = client_for(port)
            .submit(&json!({"nodes": {}}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Execution(_)));
        assert!(err.to_string().contains("CUDA out of memory"));
        Ok(())
    }

    #[tokio::test]
    async fn rejected_submission_maps_to_execution_error() -> anyhow::Result<()> {
        let router = axum::Router::new().route(
            "/prompt",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "invalid prompt"})),
                )
            }),
        );
        let port = spawn_stub(router).await?;

        let err = client_for(port)
            .submit(&json!({"nodes": {}}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Execution(_)));
        Ok(())
    }

    #[tokio::test]
    async fn never_finishing_job_times_out() -> anyhow::Result<()> {
        // History never learns about the job.
        let router = queue_route().route("/history/{id}", get(|| async { Json(json!({})) }));
        let port = spawn_stub(router).await?;

        let err = client_for(port)
            .submit(&json!({"nodes": {}}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));

        let core: ari_core::Error = err.into();
        assert_eq!(core.kind(), ari_core::ErrorKind::UpstreamTimeout);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_unavailable() {
        let client = client_for(1);
        let err = client.submit(&json!({"nodes": {}})).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));

        let core: ari_core::Error = err.into();
        assert_eq!(core.kind(), ari_core::ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn legacy_entry_without_status_finishes_on_outputs() -> anyhow::Result<()> {
        let history = |Path(id): Path<String>| async move {
            Json(json!({
                id: {
                    "outputs": {"9": {"images": [{"filename": "out.png"}]}}
                }
            }))
        };
        let router = queue_route().route("/history/{id}", get(history));
        let port = spawn_stub(router).await?;

        let result = client_for(port).submit(&json!({"nodes": {}})).await?;
        assert_eq!(result.outputs[0].filename, "out.png");
        assert_eq!(result.outputs[0].subfolder, "");
        Ok(())
    }
}
