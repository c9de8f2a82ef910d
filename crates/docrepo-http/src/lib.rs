//! HTTP transport for docrepo
//!
//! Provides a mockable HTTP client and the remote [`StorageBackend`] built on it.
//!
//! ## Features
//!
//! - **Trait-based design**: Mockable via `HttpClientTrait`
//! - **Configurable**: Timeouts, retries, proxy, user-agent
//! - **Middleware support**: Retry logic with exponential backoff
//! - **Remote records**: [`RemoteBackend`] maps key primitives onto HTTP verbs
//!
//! [`StorageBackend`]: docrepo_storage::StorageBackend

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod middleware;
pub mod remote;

pub use client::{HttpClient, HttpClientTrait, Idempotency};
pub use config::HttpConfig;
pub use credential::{CredentialProvider, StaticCredential, CREDENTIAL_HEADER};
pub use error::{HttpError, Result};
pub use middleware::{RetryConfig, RetryMiddleware};
pub use remote::{RemoteBackend, ACCESS_MODE_HEADER};

/// Re-export commonly used types
pub use reqwest::{header, Method, Response, StatusCode};
