//! In-process stub transport for testing code built on the client.

use crate::errors::{AtlassianError, AtlassianResult};
use crate::transport::{HttpTransport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use url::Url;

/// A canned reply.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
    /// Headers.
    pub headers: HashMap<String, String>,
    /// Delay before responding.
    pub delay: Option<Duration>,
    /// Final URL to report, as if the request had been redirected.
    pub redirected_to: Option<String>,
    /// Fail at the transport level with this message instead of replying.
    pub failure: Option<String>,
}

impl MockResponse {
    /// Creates an empty reply with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            body: Bytes::new(),
            headers: HashMap::new(),
            delay: None,
            redirected_to: None,
            failure: None,
        }
    }

    /// Creates a 200 OK reply with a JSON body.
    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::json(200, body)
    }

    /// Creates a reply with a JSON body.
    pub fn json<T: Serialize>(status: u16, body: &T) -> Self {
        let encoded = serde_json::to_vec(body).unwrap_or_default();
        Self::new(status)
            .with_body(encoded)
            .with_header("content-type", "application/json")
    }

    /// Creates a 204 No Content reply.
    pub fn no_content() -> Self {
        Self::new(204)
    }

    /// Creates a transport-level failure; no reply is produced.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(0)
        }
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a delay to the response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Adds a header to the response.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Reports `url` as the endpoint actually reached.
    pub fn redirected_to(mut self, url: &str) -> Self {
        self.redirected_to = Some(url.to_string());
        self
    }
}

/// A request seen by the mock.
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<Bytes>,
}

/// Behavior for requests with no registered reply.
#[derive(Debug, Clone, Copy, Default)]
pub enum DefaultBehavior {
    /// Reply 404.
    #[default]
    NotFound,
    /// Fail at the transport level.
    Error,
    /// Panic.
    Panic,
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, VecDeque<MockResponse>>,
    requests: Vec<MockRequest>,
}

/// Stub [`HttpTransport`] serving registered replies keyed by method and path.
///
/// Replies registered for the same key are served in order. Clones share
/// state, so a test can keep one handle and give another to the client.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    default_behavior: DefaultBehavior,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default behavior for unmatched requests.
    pub fn with_default_behavior(mut self, behavior: DefaultBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(method: &Method, path: &str) -> String {
        format!("{}:{}", method.as_str(), path)
    }

    /// Registers a reply for a method and URL path.
    pub fn register(&self, method: Method, path: &str, response: MockResponse) {
        self.state()
            .responses
            .entry(Self::key(&method, path))
            .or_default()
            .push_back(response);
    }

    /// Registers a GET reply.
    pub fn on_get(&self, path: &str, response: MockResponse) {
        self.register(Method::GET, path, response);
    }

    /// Registers a POST reply.
    pub fn on_post(&self, path: &str, response: MockResponse) {
        self.register(Method::POST, path, response);
    }

    /// Registers a PUT reply.
    pub fn on_put(&self, path: &str, response: MockResponse) {
        self.register(Method::PUT, path, response);
    }

    /// Registers a PATCH reply.
    pub fn on_patch(&self, path: &str, response: MockResponse) {
        self.register(Method::PATCH, path, response);
    }

    /// Registers a DELETE reply.
    pub fn on_delete(&self, path: &str, response: MockResponse) {
        self.register(Method::DELETE, path, response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.state().requests.clone()
    }

    /// Gets the most recent request.
    pub fn last_request(&self) -> Option<MockRequest> {
        self.state().requests.last().cloned()
    }

    /// Gets requests matching a method and path.
    pub fn requests_matching(&self, method: &Method, path: &str) -> Vec<MockRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| &r.method == method && r.url.path() == path)
            .cloned()
            .collect()
    }

    /// Clears recorded requests.
    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    fn build_reply(request_url: &Url, mock: MockResponse) -> AtlassianResult<TransportResponse> {
        if let Some(message) = mock.failure {
            return Err(AtlassianError::transport(message).with_endpoint(request_url.clone()));
        }

        let status = StatusCode::from_u16(mock.status).map_err(|e| {
            AtlassianError::transport(format!("invalid mock status {}", mock.status)).with_cause(e)
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &mock.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        let url = match mock.redirected_to {
            Some(ref target) => request_url.join(target).map_err(|e| {
                AtlassianError::transport(format!("invalid mock redirect {:?}", target))
                    .with_endpoint(request_url.clone())
                    .with_cause(e)
            })?,
            None => request_url.clone(),
        };

        Ok(TransportResponse {
            status,
            headers,
            url,
            body: mock.body,
        })
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: TransportRequest) -> AtlassianResult<TransportResponse> {
        let key = Self::key(&request.method, request.url.path());
        let url = request.url.clone();

        let mock = {
            let mut state = self.state();
            state.requests.push(MockRequest {
                method: request.method,
                url: request.url,
                headers: request.headers,
                body: request.body,
            });
            state.responses.get_mut(&key).and_then(VecDeque::pop_front)
        };

        let mock = match mock {
            Some(mock) => mock,
            None => match self.default_behavior {
                DefaultBehavior::NotFound => MockResponse::new(404),
                DefaultBehavior::Error => MockResponse::failure(format!("No mock response for {}", key)),
                DefaultBehavior::Panic => panic!("No mock response for {}", key),
            },
        };

        if let Some(delay) = mock.delay {
            tokio::time::sleep(delay).await;
        }

        Self::build_reply(&url, mock)
    }
}
