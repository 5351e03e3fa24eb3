//! Liveness handler.
//!
//! `GET /healthz` is a process-liveness marker only: it deliberately does
//! not probe the upstream services, so a dead upstream never makes the
//! gateway itself look dead.

use axum::Json;
use axum::Router;
use axum::routing::get;

use crate::handler::response::HealthResponse;
use crate::service::ServiceState;

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Returns a [`Router`] with the liveness route.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/healthz", get(healthz))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::handler::test::{create_test_server, create_test_state};
    use crate::service::GatewayConfig;

    #[tokio::test]
    async fn healthz_is_ok_without_upstreams() -> anyhow::Result<()> {
        // Both upstream ports are dead on purpose.
        let state = create_test_state(1, 1, GatewayConfig::default())?;
        let server = create_test_server(state)?;

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_json(&json!({"ok": true}));
        Ok(())
    }
}
