//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod chat;
mod images;
mod monitors;
mod request;
mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

use ari_core::ErrorKind;

pub use crate::handler::request::{ChatRequest, GenerateImageRequest};
pub use crate::handler::response::{ChatResponse, GenerateImageResponse, HealthResponse};
use crate::Error;
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    Error::new(ErrorKind::NotFound, "The requested route does not exist").into_response()
}

/// Returns a [`Router`] with all gateway routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(monitors::routes())
        .merge(chat::routes())
        .merge(images::routes())
        .fallback(fallback)
}
