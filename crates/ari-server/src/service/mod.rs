//! Service state and gateway configuration.

mod config;
mod state;

pub use self::config::GatewayConfig;
pub use self::state::ServiceState;
