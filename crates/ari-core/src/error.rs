//! Gateway error types and utilities.
//!
//! This module provides the shared error taxonomy for the gateway with:
//!
//! - Strongly-typed error kinds for different failure categories
//! - Builder pattern for ergonomic error construction
//! - Type-safe error source tracking with boxed trait objects
//! - Integration with `thiserror` for automatic `Display` and `Error` trait implementations

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
///
/// This is the standard error boxing type used throughout the gateway
/// for error sources. The `Send + Sync` bounds ensure errors can be
/// transferred between async tasks.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for gateway operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing gateway errors.
///
/// Each variant corresponds to a distinct failure category the HTTP layer
/// maps to a status code. It's separated from [`Error`] to allow pattern
/// matching on error types without accessing the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced file (workflow template, prompt file) does not exist.
    NotFound,
    /// A file or payload exists but is not well-formed.
    Parse,
    /// A required substitution input could not be satisfied.
    MissingInput,
    /// An upstream service could not be reached.
    UpstreamUnavailable,
    /// An upstream job did not reach a terminal state in time.
    UpstreamTimeout,
    /// An upstream service reported a job-level failure.
    UpstreamExecution,
    /// The LLM runtime has not pulled the requested model.
    ModelNotLoaded,
    /// Configuration-related errors.
    Config,
    /// Internal gateway logic errors.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    ///
    /// Useful for metrics, logging, or error categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Parse => "parse",
            Self::MissingInput => "missing_input",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::UpstreamExecution => "upstream_execution",
            Self::ModelNotLoaded => "model_not_loaded",
            Self::Config => "config",
            Self::Internal => "internal",
        }
    }

    /// Returns whether this kind describes a failure of an upstream
    /// collaborator rather than of the request itself.
    #[must_use]
    pub const fn is_upstream(self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable
                | Self::UpstreamTimeout
                | Self::UpstreamExecution
                | Self::ModelNotLoaded
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway error with structured information.
///
/// This structure provides comprehensive error information including:
///
/// - Error kind for categorization
/// - Human-readable message
/// - Optional source error for error chaining
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    /// The error category/type
    kind: ErrorKind,
    /// Human-readable error message
    message: Cow<'static, str>,
    /// Optional underlying error that caused this error
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new [`Error`].
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error, enabling error chain tracking.
    ///
    /// This method consumes the error and returns a new one with the source attached.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new not-found error.
    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a new parse error.
    #[inline]
    pub fn parse(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    /// Creates a new missing-input error.
    #[inline]
    pub fn missing_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::MissingInput, message)
    }

    /// Creates a new upstream-unavailable error for the named service.
    #[inline]
    pub fn unavailable(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let full_message = format!("{}: {}", service.into(), message.into());
        Self::new(ErrorKind::UpstreamUnavailable, full_message)
    }

    /// Creates a new upstream-timeout error for the named service.
    #[inline]
    pub fn timeout(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let full_message = format!("{}: {}", service.into(), message.into());
        Self::new(ErrorKind::UpstreamTimeout, full_message)
    }

    /// Creates a new upstream-execution error for the named service.
    #[inline]
    pub fn execution(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let full_message = format!("{}: {}", service.into(), message.into());
        Self::new(ErrorKind::UpstreamExecution, full_message)
    }

    /// Creates a new model-not-loaded error.
    #[inline]
    pub fn model_not_loaded(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ModelNotLoaded, message)
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new internal error.
    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}
