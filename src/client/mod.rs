//! Atlassian API client implementation.

use crate::auth::{Authenticator, Credentials};
use crate::config::{AtlassianConfig, AtlassianConfigBuilder};
use crate::endpoint;
use crate::errors::{AtlassianError, AtlassianResult};
use crate::request::{Payload, Request, RequestContext};
use crate::response::Response;
use crate::services::{AdminUserService, IssueVoteService, ServiceDeskRequestService};
use crate::transport::{HttpTransport, ReqwestTransport, TransportRequest};
use reqwest::Method;
use std::future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};
use url::Url;

/// Atlassian API client.
///
/// Shared by reference across domain services and concurrent calls.
/// Credential changes need `&mut self`, so they cannot race in-flight calls.
pub struct AtlassianClient {
    /// Parsed base URL.
    base_url: Url,
    /// HTTP transport.
    transport: Arc<dyn HttpTransport>,
    /// Credential state.
    auth: Authenticator,
}

impl AtlassianClient {
    /// Creates a client using the default reqwest transport.
    pub fn new(config: AtlassianConfig) -> AtlassianResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.transport)?);
        Self::with_transport(config, transport)
    }

    /// Creates a client around an injected transport.
    pub fn with_transport(
        config: AtlassianConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> AtlassianResult<Self> {
        let base_url = config.validate()?;

        let mut auth = Authenticator::new();
        if let Some(ua) = config.user_agent {
            auth.set_user_agent(ua);
        }

        Ok(Self {
            base_url,
            transport,
            auth,
        })
    }

    /// Creates a new client builder.
    pub fn builder() -> AtlassianClientBuilder {
        AtlassianClientBuilder::new()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Gets the authenticator.
    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    /// Gets the authenticator for reconfiguration.
    pub fn auth_mut(&mut self) -> &mut Authenticator {
        &mut self.auth
    }

    // Service accessors

    /// Gets the issue votes service.
    pub fn issue_votes(&self) -> IssueVoteService<'_> {
        IssueVoteService::new(self)
    }

    /// Gets the organization admin users service.
    pub fn admin_users(&self) -> AdminUserService<'_> {
        AdminUserService::new(self)
    }

    /// Gets the service desk customer requests service.
    pub fn service_desk_requests(&self) -> ServiceDeskRequestService<'_> {
        ServiceDeskRequestService::new(self)
    }

    // Pipeline

    /// Resolves a relative API path against the base URL.
    pub fn resolve(&self, path: &str) -> AtlassianResult<Url> {
        endpoint::resolve(&self.base_url, path)
    }

    /// Resolves the path, builds the request and applies credentials.
    pub fn new_request(
        &self,
        ctx: RequestContext,
        method: Method,
        path: &str,
        payload: Payload<'_>,
    ) -> AtlassianResult<Request> {
        let url = self.resolve(path)?;
        let mut request = Request::build(ctx, method, url, payload)?;
        self.auth.apply(request.headers_mut());
        Ok(request)
    }

    /// Executes a request exactly once.
    ///
    /// Any HTTP reply, 4xx and 5xx included, comes back as a [`Response`].
    /// Errors mean no reply was obtained: the transport failed, or the
    /// request context was cancelled or expired first.
    #[instrument(
        name = "atlassian.execute",
        skip(self, request),
        fields(method = %request.method(), url = %request.url())
    )]
    pub async fn execute(&self, request: Request) -> AtlassianResult<Response> {
        let (method, url, headers, body, ctx) = request.into_parts();

        ctx.check().map_err(|e| e.with_endpoint(url.clone()))?;

        let started = Instant::now();
        debug!("dispatching request");

        let send = self.transport.send(TransportRequest {
            method: method.clone(),
            url: url.clone(),
            headers,
            body,
        });

        let deadline = async {
            match ctx.deadline() {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => future::pending::<()>().await,
            }
        };

        // Losing branches are dropped, which aborts the in-flight exchange.
        let reply = tokio::select! {
            biased;
            _ = ctx.token().cancelled() => {
                return Err(AtlassianError::cancelled().with_endpoint(url));
            }
            _ = deadline => {
                return Err(AtlassianError::deadline_exceeded().with_endpoint(url));
            }
            result = send => result?,
        };

        debug!(
            status = reply.status.as_u16(),
            endpoint = %reply.url,
            bytes = reply.body.len(),
            elapsed_ms = elapsed_ms(started.elapsed()),
            "request completed"
        );

        Ok(Response::new(
            method,
            reply.status,
            reply.url,
            reply.headers,
            reply.body,
        ))
    }

    /// Builds and executes a request in one step.
    pub async fn call(
        &self,
        ctx: RequestContext,
        method: Method,
        path: &str,
        payload: Payload<'_>,
    ) -> AtlassianResult<Response> {
        let request = self.new_request(ctx, method, path, payload)?;
        self.execute(request).await
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Builder for AtlassianClient.
pub struct AtlassianClientBuilder {
    config_builder: AtlassianConfigBuilder,
    credentials: Option<Credentials>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl AtlassianClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: AtlassianConfig::builder(),
            credentials: None,
            transport: None,
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets basic credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::basic(username, secret));
        self
    }

    /// Sets a bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::bearer(token));
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Sets the transport timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets how many redirects the transport follows.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config_builder = self.config_builder.max_redirects(max);
        self
    }

    /// Injects a transport instead of the default reqwest one.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> AtlassianResult<AtlassianClient> {
        let config = self.config_builder.build()?;
        let mut client = match self.transport {
            Some(transport) => AtlassianClient::with_transport(config, transport)?,
            None => AtlassianClient::new(config)?,
        };

        if let Some(credentials) = self.credentials {
            client.auth_mut().set_credentials(credentials);
        }

        Ok(client)
    }
}

impl Default for AtlassianClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
