//! HTTP server startup and lifecycle management.

mod error;
mod http_server;
mod shutdown;

use axum::Router;
pub use error::{Result, ServerError};
use http_server::serve_http;
use shutdown::shutdown_signal;

use crate::config::ServerConfig;

/// Starts the HTTP server with graceful shutdown handling.
///
/// # Errors
///
/// Returns an error if:
/// - The server configuration is invalid
/// - The listening socket cannot be bound
/// - The server loop fails at runtime
pub async fn serve(app: Router, config: ServerConfig) -> Result<()> {
    serve_http(app, config).await
}
