//! Startup readiness probes for the upstream services.
//!
//! Probing is best-effort: the gateway starts even when an upstream is
//! still warming up, since every request path contacts the upstream
//! anyway and reports the failure to the caller. Exhausted probes log a
//! warning instead of aborting startup.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use ari_comfy::ComfyClient;
use ari_ollama::OllamaClient;
use ari_server::service::ServiceState;
use axum::extract::FromRef;

/// Tracing target for readiness probe events.
const TRACING_TARGET: &str = "ari_cli::readiness";

const PROBE_ATTEMPTS: u32 = 10;
const PROBE_INTERVAL: Duration = Duration::from_secs(2);

/// Probes both upstream services until they respond or attempts run out.
pub async fn probe_upstreams(state: &ServiceState) {
    let ollama = OllamaClient::from_ref(state);
    let comfy = ComfyClient::from_ref(state);

    tokio::join!(
        probe("ollama", || ollama.health_check()),
        probe("comfyui", || comfy.health_check()),
    );
}

/// Retries a single health check with a fixed interval between attempts.
async fn probe<F, Fut, E>(service: &str, check: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: fmt::Display,
{
    for attempt in 1..=PROBE_ATTEMPTS {
        match check().await {
            Ok(()) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    service,
                    attempt,
                    "Upstream is ready"
                );
                return;
            }
            Err(error) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    service,
                    attempt,
                    error = %error,
                    "Upstream not ready yet"
                );
            }
        }

        if attempt < PROBE_ATTEMPTS {
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }

    tracing::warn!(
        target: TRACING_TARGET,
        service,
        attempts = PROBE_ATTEMPTS,
        "Upstream never became ready, starting anyway"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn probe_stops_on_first_success() {
        let calls = AtomicU32::new(0);

        probe("stub", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), &str>(()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_retries_until_success() {
        let calls = AtomicU32::new(0);

        probe("stub", || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt < 3 {
                    Err("still starting")
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_gives_up_after_all_attempts() {
        let calls = AtomicU32::new(0);

        probe("stub", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), &str>("down") }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), PROBE_ATTEMPTS);
    }
}
