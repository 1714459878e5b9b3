//! Normalized response wrapper.

use crate::errors::{AtlassianError, AtlassianErrorKind, AtlassianResult};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// Longest body excerpt carried by status errors.
const BODY_EXCERPT_LEN: usize = 512;

/// A received HTTP reply, whatever its status.
///
/// Keeps the exact body bytes and the endpoint actually hit so callers can
/// log diagnostics before deciding whether the call failed.
#[derive(Debug, Clone)]
pub struct Response {
    method: Method,
    status: StatusCode,
    endpoint: Url,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    pub(crate) fn new(
        method: Method,
        status: StatusCode,
        endpoint: Url,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            status,
            endpoint,
            headers,
            body,
        }
    }

    /// Gets the method that was sent.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Gets the HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Gets the numeric HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Gets the endpoint the reply came from, after redirects.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Gets the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets the raw body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Gets the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    pub fn decode<T: DeserializeOwned>(&self) -> AtlassianResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            AtlassianError::decoding(format!("Failed to deserialize response: {}", e))
                .with_status(self.status_code())
                .with_endpoint(self.endpoint.clone())
                .with_response(self.clone())
                .with_cause(e)
        })
    }

    /// Fails unless the status is 2xx.
    pub fn error_for_status(&self) -> AtlassianResult<&Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(self.status_error())
    }

    /// Fails unless the status equals `expected`.
    pub fn expect_status(&self, expected: StatusCode) -> AtlassianResult<&Self> {
        if self.status == expected {
            return Ok(self);
        }
        Err(self.status_error())
    }

    fn status_error(&self) -> AtlassianError {
        let text = self.text();
        let excerpt: String = text.chars().take(BODY_EXCERPT_LEN).collect();
        let message = if excerpt.is_empty() {
            format!("{} {} returned {}", self.method, self.endpoint.path(), self.status)
        } else {
            format!(
                "{} {} returned {}: {}",
                self.method,
                self.endpoint.path(),
                self.status,
                excerpt
            )
        };

        AtlassianError::new(AtlassianErrorKind::UnexpectedStatus, message)
            .with_status(self.status_code())
            .with_endpoint(self.endpoint.clone())
            .with_response(self.clone())
    }
}
