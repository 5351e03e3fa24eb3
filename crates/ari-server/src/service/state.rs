//! Application state and dependency injection.

use ari_comfy::{ComfyClient, ComfyConfig, TemplateStore};
use ari_ollama::{OllamaClient, OllamaConfig};

use crate::Result;
use crate::service::GatewayConfig;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection). There is no
/// shared mutable state: each field is a cheaply cloneable handle, and
/// concurrent requests never coordinate.
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    ollama_client: OllamaClient,
    comfy_client: ComfyClient,
    template_store: TemplateStore,
    gateway_config: GatewayConfig,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Builds both upstream clients and the template store. Neither
    /// upstream is contacted here; readiness probing is the binary's
    /// concern.
    pub fn from_config(
        ollama_config: OllamaConfig,
        comfy_config: ComfyConfig,
        gateway_config: GatewayConfig,
    ) -> Result<Self> {
        let ollama_client = OllamaClient::new(ollama_config)?;
        let comfy_client = ComfyClient::new(comfy_config)?;
        let template_store = TemplateStore::new(&gateway_config.workflow_dir);

        Ok(Self {
            ollama_client,
            comfy_client,
            template_store,
            gateway_config,
        })
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(ollama_client: OllamaClient);
impl_di!(comfy_client: ComfyClient);
impl_di!(template_store: TemplateStore);
impl_di!(gateway_config: GatewayConfig);
