//! Handler error type and its HTTP mapping.
//!
//! Every failure a handler can produce carries an [`ari_core::ErrorKind`],
//! and each kind maps to exactly one status code:
//!
//! | Kind | Status |
//! |---|---|
//! | `NotFound` | 404 |
//! | `Parse`, `MissingInput` | 400 |
//! | `UpstreamUnavailable`, `UpstreamExecution`, `ModelNotLoaded` | 502 |
//! | `UpstreamTimeout` | 504 |
//! | `Config`, `Internal` | 500 |

use std::borrow::Cow;
use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use ari_core::ErrorKind;

/// Tracing target for error-to-response mapping.
const TRACING_TARGET: &str = "ari_server::error";

/// The error type for HTTP handlers in the gateway.
#[derive(Debug)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    resource: Option<Cow<'static, str>>,
}

impl Error {
    /// Creates a new [`Error`] with the specified kind and message.
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            resource: None,
        }
    }

    /// Sets the resource that caused the error.
    #[inline]
    pub fn with_resource(mut self, resource: impl Into<Cow<'static, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the status code this error serializes to.
    pub fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Parse | ErrorKind::MissingInput => StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamUnavailable
            | ErrorKind::UpstreamExecution
            | ErrorKind::ModelNotLoaded => StatusCode::BAD_GATEWAY,
            ErrorKind::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Config | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.status(), self.message)?;

        if let Some(ref resource) = self.resource {
            write!(f, " [resource: {resource}]")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        tracing::debug!(
            target: TRACING_TARGET,
            kind = %self.kind,
            status = status.as_u16(),
            message = %self.message,
            "Handler error mapped to response"
        );

        let body = ErrorResponse {
            name: Cow::Borrowed(self.kind.as_str()),
            message: self.message,
            resource: self.resource,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ari_core::Error> for Error {
    fn from(err: ari_core::Error) -> Self {
        Self::new(err.kind(), err.message().to_string())
    }
}

impl From<ari_ollama::Error> for Error {
    fn from(err: ari_ollama::Error) -> Self {
        ari_core::Error::from(err).into()
    }
}

impl From<ari_comfy::Error> for Error {
    fn from(err: ari_comfy::Error) -> Self {
        ari_core::Error::from(err).into()
    }
}

/// HTTP error response body.
///
/// The `name` field is the stable, machine-matchable identifier; callers
/// distinguish "bad request" from "upstream failed" by it, not by parsing
/// the message.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// The error name/type identifier
    pub name: Cow<'static, str>,
    /// Human-readable error message
    pub message: Cow<'static, str>,
    /// The resource that the error relates to (optional, set by handler)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'static, str>>,
}

/// A specialized [`Result`] type for HTTP handler operations.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_map_to_4xx() {
        assert_eq!(
            Error::new(ErrorKind::NotFound, "x").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::new(ErrorKind::Parse, "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::new(ErrorKind::MissingInput, "x").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn upstream_errors_map_to_gateway_statuses() {
        assert_eq!(
            Error::new(ErrorKind::UpstreamUnavailable, "x").status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::new(ErrorKind::UpstreamExecution, "x").status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::new(ErrorKind::ModelNotLoaded, "x").status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::new(ErrorKind::UpstreamTimeout, "x").status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn response_body_skips_absent_resource() {
        let body = ErrorResponse {
            name: Cow::Borrowed("not_found"),
            message: Cow::Borrowed("missing"),
            resource: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("resource"));
    }

    #[test]
    fn distinct_upstream_failures_have_distinct_names() {
        let execution = Error::from(ari_core::Error::execution("comfyui", "boom"));
        let unreachable = Error::from(ari_core::Error::unavailable("comfyui", "refused"));

        assert_ne!(execution.kind().as_str(), unreachable.kind().as_str());
    }
}
