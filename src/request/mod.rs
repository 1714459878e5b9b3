//! Request building: payload encoding, headers and the request context.

use crate::errors::{AtlassianError, AtlassianResult};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// JSON media type.
pub const APPLICATION_JSON: &str = "application/json";

/// A value that can be encoded as a JSON request body.
///
/// Implemented for every `Serialize` type so payloads can be passed as
/// trait objects without making the builder generic.
pub trait JsonBody: Sync {
    /// Encodes the value as JSON bytes.
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T: Serialize + Sync + ?Sized> JsonBody for T {
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Request body, resolved to bytes when the request is built.
#[derive(Clone, Copy, Default)]
pub enum Payload<'a> {
    /// No body.
    #[default]
    Empty,
    /// Pre-encoded bytes, sent as-is.
    Raw(&'a Bytes),
    /// A structured value, encoded as JSON.
    Json(&'a dyn JsonBody),
}

impl<'a> Payload<'a> {
    /// Wraps a serializable value.
    pub fn json<T: Serialize + Sync>(value: &'a T) -> Self {
        Self::Json(value)
    }

    /// Wraps pre-encoded bytes.
    pub fn raw(bytes: &'a Bytes) -> Self {
        Self::Raw(bytes)
    }

    fn encode(self) -> AtlassianResult<Option<Bytes>> {
        match self {
            Self::Empty => Ok(None),
            Self::Raw(bytes) => Ok(Some(bytes.clone())),
            Self::Json(value) => value
                .to_json()
                .map(|encoded| Some(Bytes::from(encoded)))
                .map_err(|e| {
                    AtlassianError::encoding(format!("failed to serialize request body: {}", e))
                        .with_cause(e)
                }),
        }
    }
}

impl fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Raw(bytes) => write!(f, "Raw({} bytes)", bytes.len()),
            Self::Json(_) => write!(f, "Json(..)"),
        }
    }
}

/// Cancellation and deadline scope for a request.
///
/// Cloning shares the cancellation token, so cancelling any clone cancels
/// every request carrying it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context bound to an external cancellation token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Sets the deadline `timeout` from now, keeping an earlier one.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Sets the deadline, keeping an earlier one.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    /// Derives a child context: cancelling the parent cancels the child,
    /// not the reverse.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancels the context.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the context was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns true once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Gets the deadline.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Gets the cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fails if the context already ended.
    pub fn check(&self) -> AtlassianResult<()> {
        if self.is_cancelled() {
            return Err(AtlassianError::cancelled());
        }
        if self.is_expired() {
            return Err(AtlassianError::deadline_exceeded());
        }
        Ok(())
    }
}

/// A built request, ready for execution.
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    context: RequestContext,
}

impl Request {
    /// Builds a request.
    ///
    /// Encodes the payload and sets `Content-Type: application/json` when a
    /// body is present. Fails with an encoding error, producing no request,
    /// when a JSON payload cannot be serialized.
    pub fn build(
        context: RequestContext,
        method: Method,
        url: Url,
        payload: Payload<'_>,
    ) -> AtlassianResult<Self> {
        let body = payload.encode()?;

        let mut headers = HeaderMap::new();
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }

        Ok(Self {
            method,
            url,
            headers,
            body,
            context,
        })
    }

    /// Sets the Accept header.
    pub fn accept(mut self, media_type: &'static str) -> Self {
        self.headers
            .insert(ACCEPT, HeaderValue::from_static(media_type));
        self
    }

    /// Sets an arbitrary header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Gets the method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Gets the absolute URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Gets the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets the headers for modification.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Gets the encoded body.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Gets the context.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub(crate) fn into_parts(self) -> (Method, Url, HeaderMap, Option<Bytes>, RequestContext) {
        (self.method, self.url, self.headers, self.body, self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AtlassianErrorKind;
    use pretty_assertions::assert_eq;
    use serde::ser::Error as _;
    use serde::Serializer;

    #[derive(Serialize)]
    struct LinkType {
        inward: &'static str,
        name: &'static str,
        outward: &'static str,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot encode"))
        }
    }

    fn url() -> Url {
        Url::parse("https://example.atlassian.net/rest/api/3/issueLinkType").unwrap()
    }

    #[test]
    fn test_empty_payload_has_no_body_or_content_type() {
        let request =
            Request::build(RequestContext::background(), Method::GET, url(), Payload::Empty).unwrap();

        assert!(request.body().is_none());
        assert!(request.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_json_payload_sets_content_type() {
        let payload = LinkType {
            inward: "Duplicated by",
            name: "Duplicate",
            outward: "Duplicates",
        };
        let request = Request::build(
            RequestContext::background(),
            Method::POST,
            url(),
            Payload::json(&payload),
        )
        .unwrap();

        assert_eq!(request.headers().get(CONTENT_TYPE).unwrap(), APPLICATION_JSON);
        let decoded: serde_json::Value = serde_json::from_slice(request.body().unwrap()).unwrap();
        assert_eq!(
            decoded,
            serde_json::json!({"inward": "Duplicated by", "name": "Duplicate", "outward": "Duplicates"})
        );
    }

    #[test]
    fn test_raw_payload_is_sent_verbatim() {
        let bytes = Bytes::from_static(b"{\"name\":\"Duplicate\"}");
        let request = Request::build(
            RequestContext::background(),
            Method::PUT,
            url(),
            Payload::raw(&bytes),
        )
        .unwrap();

        assert_eq!(request.body(), Some(&bytes));
        assert_eq!(request.headers().get(CONTENT_TYPE).unwrap(), APPLICATION_JSON);
    }

    #[test]
    fn test_encoding_failure() {
        let error = Request::build(
            RequestContext::background(),
            Method::POST,
            url(),
            Payload::json(&Unserializable),
        )
        .unwrap_err();

        assert_eq!(error.kind(), AtlassianErrorKind::EncodingError);
    }

    #[test]
    fn test_accept_is_left_to_caller() {
        let request = Request::build(RequestContext::background(), Method::GET, url(), Payload::Empty)
            .unwrap();
        assert!(request.headers().get(ACCEPT).is_none());

        let request = request.accept(APPLICATION_JSON);
        assert_eq!(request.headers().get(ACCEPT).unwrap(), APPLICATION_JSON);
    }

    #[tokio::test]
    async fn test_context_cancellation() {
        let ctx = RequestContext::background();
        let child = ctx.child();
        assert!(ctx.check().is_ok());

        ctx.cancel();
        assert!(child.is_cancelled());
        assert_eq!(child.check().unwrap_err().kind(), AtlassianErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_child_cancel_does_not_reach_parent() {
        let ctx = RequestContext::background();
        ctx.child().cancel();
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_deadline() {
        let ctx = RequestContext::background().with_timeout(Duration::from_secs(5));
        assert!(!ctx.is_expired());

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(ctx.check().unwrap_err().kind(), AtlassianErrorKind::DeadlineExceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_deadline_is_kept() {
        let ctx = RequestContext::background()
            .with_timeout(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(ctx.is_expired());
    }
}
