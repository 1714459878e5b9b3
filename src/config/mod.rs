//! Configuration types for the Atlassian client.

use crate::auth::DEFAULT_USER_AGENT;
use crate::endpoint;
use crate::errors::{AtlassianError, AtlassianResult};
use std::time::Duration;
use url::Url;

/// Organization administration API base URL.
pub const ADMIN_BASE_URL: &str = "https://api.atlassian.com/admin";

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of redirects the transport follows.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum idle connections per host.
    pub max_idle_per_host: usize,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 20,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Settings of the default reqwest transport.
///
/// None of these are enforced by the request pipeline itself; a custom
/// transport is free to ignore them.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Total per-call timeout. `None` leaves timing to the request context.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Redirects to follow; `0` disables redirect following.
    pub max_redirects: usize,
    /// Connection pool configuration.
    pub pool: PoolConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            pool: PoolConfig::default(),
        }
    }
}

/// Atlassian client configuration.
#[derive(Debug, Clone)]
pub struct AtlassianConfig {
    /// API base URL (site URL for Jira, API gateway for admin).
    pub base_url: String,
    /// User-Agent header, overriding the crate default.
    pub user_agent: Option<String>,
    /// Transport settings.
    pub transport: TransportConfig,
}

impl AtlassianConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> AtlassianConfigBuilder {
        AtlassianConfigBuilder::new()
    }

    /// Configuration for a Jira (or Jira Service Management) site,
    /// e.g. `https://example.atlassian.net`.
    pub fn jira(site: impl Into<String>) -> Self {
        Self {
            base_url: site.into(),
            user_agent: None,
            transport: TransportConfig::default(),
        }
    }

    /// Configuration for the organization administration API.
    pub fn admin() -> Self {
        Self::jira(ADMIN_BASE_URL)
    }

    /// Validates the configuration and returns the parsed base URL.
    pub fn validate(&self) -> AtlassianResult<Url> {
        if self.base_url.is_empty() {
            return Err(AtlassianError::configuration("Base URL cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(AtlassianError::configuration(
                "Base URL must start with http:// or https://",
            ));
        }

        if let Some(ref ua) = self.user_agent {
            if ua.is_empty() {
                return Err(AtlassianError::configuration("User-Agent cannot be empty"));
            }
        }

        if self.transport.timeout == Some(Duration::ZERO) {
            return Err(AtlassianError::configuration("Timeout must be greater than zero"));
        }

        endpoint::parse_base(&self.base_url)
    }

    /// Gets the User-Agent that will be sent.
    pub fn effective_user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Builder for AtlassianConfig.
#[derive(Debug, Default)]
pub struct AtlassianConfigBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    max_redirects: Option<usize>,
    pool: Option<PoolConfig>,
}

impl AtlassianConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the total per-call timeout of the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets how many redirects the transport follows.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = Some(max);
        self
    }

    /// Disables redirect following.
    pub fn no_redirects(self) -> Self {
        self.max_redirects(0)
    }

    /// Sets the connection pool configuration.
    pub fn pool(mut self, config: PoolConfig) -> Self {
        self.pool = Some(config);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> AtlassianResult<AtlassianConfig> {
        let base_url = self
            .base_url
            .ok_or_else(|| AtlassianError::configuration("Base URL is required"))?;

        let config = AtlassianConfig {
            base_url,
            user_agent: self.user_agent,
            transport: TransportConfig {
                timeout: self.timeout,
                connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
                max_redirects: self.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS),
                pool: self.pool.unwrap_or_default(),
            },
        };

        config.validate()?;
        Ok(config)
    }
}
