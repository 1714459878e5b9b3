//! Error types for the Atlassian client.

use crate::response::Response;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Result type alias for Atlassian operations.
pub type AtlassianResult<T> = Result<T, AtlassianError>;

/// Error kinds for categorizing Atlassian errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtlassianErrorKind {
    // Local errors, detected before any network activity
    /// Malformed base URL or relative path.
    InvalidUrl,
    /// Request payload could not be serialized to JSON.
    EncodingError,
    /// Invalid client configuration.
    InvalidConfiguration,
    /// A required operation parameter is missing or empty.
    MissingParameter,

    // Transport errors
    /// Connection-level failure (DNS, refused, reset, transport timeout).
    TransportFailure,
    /// The request context was cancelled by the caller.
    Cancelled,
    /// The request context deadline passed before completion.
    DeadlineExceeded,

    // Raised by domain services only
    /// Response bytes do not match the expected shape.
    DecodingError,
    /// The remote API answered with a status the operation does not accept.
    UnexpectedStatus,
}

impl fmt::Display for AtlassianErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl => write!(f, "invalid_url"),
            Self::EncodingError => write!(f, "encoding_error"),
            Self::InvalidConfiguration => write!(f, "invalid_configuration"),
            Self::MissingParameter => write!(f, "missing_parameter"),
            Self::TransportFailure => write!(f, "transport_failure"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::DeadlineExceeded => write!(f, "deadline_exceeded"),
            Self::DecodingError => write!(f, "decoding_error"),
            Self::UnexpectedStatus => write!(f, "unexpected_status"),
        }
    }
}

/// Atlassian client error with diagnostic context.
#[derive(Error, Debug)]
pub struct AtlassianError {
    /// Error kind.
    kind: AtlassianErrorKind,
    /// Error message.
    message: String,
    /// HTTP status code, for errors derived from a received response.
    status_code: Option<u16>,
    /// Endpoint involved in the failure.
    endpoint: Option<Url>,
    /// Reply the error was derived from, with full body and headers.
    response: Option<Box<Response>>,
    /// Underlying cause.
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for AtlassianError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        if let Some(ref endpoint) = self.endpoint {
            write!(f, " [endpoint: {}]", endpoint)?;
        }
        Ok(())
    }
}

impl AtlassianError {
    /// Creates a new error.
    pub fn new(kind: AtlassianErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            endpoint: None,
            response: None,
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the endpoint involved.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Attaches the received reply.
    pub fn with_response(mut self, response: Response) -> Self {
        self.response = Some(Box::new(response));
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> AtlassianErrorKind {
        self.kind
    }

    /// Gets the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the endpoint involved.
    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Gets the reply the error was derived from, if any.
    ///
    /// Set for `UnexpectedStatus` and `DecodingError`, so the complete body
    /// and headers stay available for diagnostics.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_deref()
    }

    /// Returns true if the caller ended the request through its context,
    /// as opposed to a network failure.
    pub fn is_caller_abort(&self) -> bool {
        matches!(
            self.kind,
            AtlassianErrorKind::Cancelled | AtlassianErrorKind::DeadlineExceeded
        )
    }

    /// Returns true if the failure happened before anything was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self.kind,
            AtlassianErrorKind::InvalidUrl
                | AtlassianErrorKind::EncodingError
                | AtlassianErrorKind::InvalidConfiguration
                | AtlassianErrorKind::MissingParameter
        )
    }

    // Convenience constructors

    /// Creates an invalid URL error.
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::new(AtlassianErrorKind::InvalidUrl, message)
    }

    /// Creates a payload encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(AtlassianErrorKind::EncodingError, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AtlassianErrorKind::InvalidConfiguration, message)
    }

    /// Creates a missing parameter error.
    pub fn missing_parameter(name: &str) -> Self {
        Self::new(
            AtlassianErrorKind::MissingParameter,
            format!("please provide a valid {} value", name),
        )
    }

    /// Creates a transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(AtlassianErrorKind::TransportFailure, message)
    }

    /// Creates a cancellation error.
    pub fn cancelled() -> Self {
        Self::new(AtlassianErrorKind::Cancelled, "request context was cancelled")
    }

    /// Creates a deadline error.
    pub fn deadline_exceeded() -> Self {
        Self::new(
            AtlassianErrorKind::DeadlineExceeded,
            "request context deadline exceeded",
        )
    }

    /// Creates a response decoding error.
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::new(AtlassianErrorKind::DecodingError, message)
    }
}
