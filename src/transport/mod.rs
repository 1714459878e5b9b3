//! HTTP transport layer.
//!
//! The transport executes one exchange and hands back the status, headers,
//! final URL and the fully-read body. It never interprets the status code.

use crate::config::TransportConfig;
use crate::errors::{AtlassianError, AtlassianResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use url::Url;

/// A request as handed to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<Bytes>,
}

/// A reply received from the remote side, of any status.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// URL the reply came from, after redirects.
    pub url: Url,
    /// Complete response body.
    pub body: Bytes,
}

/// HTTP transport trait.
///
/// Implementations return `Ok` for every HTTP reply they receive, whatever
/// its status, and an error only when no reply was obtained.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request once and reads the whole reply.
    async fn send(&self, request: TransportRequest) -> AtlassianResult<TransportResponse>;
}

/// Default HTTP transport implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport from the given settings.
    pub fn new(config: &TransportConfig) -> AtlassianResult<Self> {
        let redirect = if config.max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(config.max_redirects)
        };

        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool.max_idle_per_host)
            .pool_idle_timeout(config.pool.idle_timeout)
            .redirect(redirect);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            AtlassianError::configuration(format!("Failed to create HTTP client: {}", e))
                .with_cause(e)
        })?;

        Ok(Self { client })
    }

    /// Creates a transport around a pre-built client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn map_error(error: reqwest::Error, url: &Url) -> AtlassianError {
        let message = if error.is_timeout() {
            format!("Request timed out: {}", error)
        } else if error.is_connect() {
            format!("Connection failed: {}", error)
        } else if error.is_redirect() {
            format!("Redirect policy violated: {}", error)
        } else if error.is_body() || error.is_decode() {
            format!("Failed to read response body: {}", error)
        } else {
            format!("Request failed: {}", error)
        };

        let endpoint = error.url().cloned().unwrap_or_else(|| url.clone());
        AtlassianError::transport(message)
            .with_endpoint(endpoint)
            .with_cause(error)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> AtlassianResult<TransportResponse> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url.clone()).headers(headers);
        if let Some(bytes) = body {
            builder = builder.body(bytes);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(e, &url))?;

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();

        // Consuming the body hands the connection back to the pool.
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(e, &final_url))?;

        Ok(TransportResponse {
            status,
            headers,
            url: final_url,
            body,
        })
    }
}
