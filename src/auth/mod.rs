//! Authentication for Atlassian Cloud requests.
//!
//! An [`Authenticator`] holds at most one credential scheme (basic auth or a
//! bearer token) and an optional user-agent override, and stamps them onto
//! outgoing request headers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = concat!("integrations-atlassian/", env!("CARGO_PKG_VERSION"));

/// Credential material.
#[derive(Clone)]
pub enum Credentials {
    /// HTTP Basic authentication (account e-mail and API token).
    Basic {
        /// Account identity.
        username: String,
        /// API token or password.
        secret: SecretString,
    },
    /// Bearer token (organization API key, OAuth access token).
    Bearer(SecretString),
}

impl Credentials {
    /// Creates basic credentials.
    pub fn basic(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            secret: SecretString::new(secret.into()),
        }
    }

    /// Creates bearer credentials.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(SecretString::new(token.into()))
    }

    /// Gets the scheme of these credentials.
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Self::Basic { .. } => AuthScheme::Basic,
            Self::Bearer(_) => AuthScheme::Bearer,
        }
    }

    /// Renders the Authorization header value.
    fn header_value(&self) -> Option<HeaderValue> {
        let raw = match self {
            Self::Basic { username, secret } => {
                let pair = format!("{}:{}", username, secret.expose_secret());
                format!("Basic {}", STANDARD.encode(pair))
            }
            Self::Bearer(token) => format!("Bearer {}", token.expose_secret()),
        };

        let mut value = HeaderValue::from_str(&raw).ok()?;
        value.set_sensitive(true);
        Some(value)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("secret", &"***")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"***").finish(),
        }
    }
}

/// Active authentication scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// No credentials configured.
    None,
    /// HTTP Basic.
    Basic,
    /// Bearer token.
    Bearer,
}

/// Holds credential state and applies it to outgoing requests.
///
/// Setters take `&mut self`: configure the client before sharing it across
/// concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    credentials: Option<Credentials>,
    user_agent: Option<String>,
}

impl Authenticator {
    /// Creates an authenticator without credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores basic credentials, replacing any bearer token.
    pub fn set_basic_auth(&mut self, username: impl Into<String>, secret: impl Into<String>) {
        self.credentials = Some(Credentials::basic(username, secret));
    }

    /// Stores a bearer token, replacing any basic credentials.
    pub fn set_bearer_token(&mut self, token: impl Into<String>) {
        self.credentials = Some(Credentials::bearer(token));
    }

    /// Replaces the credentials wholesale.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Overrides the User-Agent header.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = Some(user_agent.into());
    }

    /// Removes any stored credentials.
    pub fn clear_credentials(&mut self) {
        self.credentials = None;
    }

    /// Gets the active scheme.
    pub fn scheme(&self) -> AuthScheme {
        self.credentials
            .as_ref()
            .map_or(AuthScheme::None, Credentials::scheme)
    }

    /// Gets the User-Agent sent with requests.
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Stamps credentials and User-Agent onto the headers.
    ///
    /// Overwrites rather than appends, so applying twice is the same as once.
    /// Values that are not valid header text are skipped.
    pub fn apply(&self, headers: &mut HeaderMap) {
        match self.credentials.as_ref().and_then(Credentials::header_value) {
            Some(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                headers.remove(AUTHORIZATION);
            }
        }

        if let Ok(value) = HeaderValue::from_str(self.user_agent()) {
            headers.insert(USER_AGENT, value);
        }
    }
}
