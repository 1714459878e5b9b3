//! # Atlassian Integration Library
//!
//! The shared request pipeline behind typed Atlassian Cloud operations:
//! - Endpoint resolution against a site or API gateway base URL
//! - Basic auth or bearer token authentication, with User-Agent override
//! - JSON request building with cancellation and deadline propagation
//! - A pluggable HTTP transport (reqwest by default)
//! - Normalized responses that keep status, raw body and the endpoint hit
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_atlassian::{AtlassianClient, AtlassianConfig, RequestContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = AtlassianClient::new(AtlassianConfig::jira("https://example.atlassian.net"))?;
//!     client.auth_mut().set_basic_auth("user@example.com", "api-token");
//!
//!     let (votes, response) = client
//!         .issue_votes()
//!         .get(RequestContext::background(), "KP-1")
//!         .await?;
//!
//!     println!("{} votes via {}", votes.votes, response.endpoint());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Authentication
pub mod auth;

// Request pipeline
pub mod endpoint;
pub mod request;
pub mod response;
pub mod transport;

// HTTP client
pub mod client;

// API Services
pub mod services;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use auth::{AuthScheme, Authenticator, Credentials};
pub use client::{AtlassianClient, AtlassianClientBuilder};
pub use config::{AtlassianConfig, AtlassianConfigBuilder, TransportConfig};
pub use errors::{AtlassianError, AtlassianErrorKind, AtlassianResult};
pub use request::{Payload, Request, RequestContext};
pub use response::Response;
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
pub use types::*;

pub use reqwest::{Method, StatusCode};
pub use tokio_util::sync::CancellationToken;
