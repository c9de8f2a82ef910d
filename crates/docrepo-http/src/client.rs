//! HTTP client implementation

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Method, Response, StatusCode, Url};
use tracing::debug;

use crate::{
    config::HttpConfig,
    error::{HttpError, Result},
    middleware::{RetryConfig, RetryMiddleware},
};

/// Whether a request may be replayed after a transient failure
///
/// A replayed conditional `PUT` or `DELETE` can observe its own earlier
/// effect (`412`, `404`) and report the opposite of what happened, so those
/// are sent once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    Idempotent,
    NonIdempotent,
}

/// Mockable HTTP client trait
#[async_trait]
pub trait HttpClientTrait: Send + Sync {
    /// Execute a request, retrying transient failures of idempotent requests
    ///
    /// Any status that is neither a server error nor `429` is handed back to
    /// the caller, which decides what `404` or `409` mean for its resource.
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
        idempotency: Idempotency,
    ) -> Result<Response>;
}

/// Production HTTP client
pub struct HttpClient {
    inner: reqwest::Client,
    config: HttpConfig,
    retry: RetryMiddleware,
}

impl HttpClient {
    /// Create a new HTTP client with configuration
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| HttpError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::BuildError(e.to_string()))?;

        let retry_config = RetryConfig {
            max_attempts: config.retry_count,
            initial_delay: config.retry_delay,
            ..Default::default()
        };

        Ok(Self {
            inner,
            config,
            retry: RetryMiddleware::new(retry_config),
        })
    }

    /// Create HTTP client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpConfig::default())
    }

    /// Get configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
        idempotency: Idempotency,
    ) -> Result<Response> {
        let url = Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        debug!("HTTP {}: {} ({:?})", method, url, idempotency);

        let attempt = || {
            let mut request = self
                .inner
                .request(method.clone(), url.clone())
                .headers(headers.clone());
            if let Some(bytes) = &body {
                request = request.body(bytes.clone());
            }

            async move {
                let response = request.send().await?;
                let status = response.status();
                if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                    let message = response.text().await.unwrap_or_default();
                    return Err(HttpError::HttpStatus { status, message });
                }
                Ok(response)
            }
        };

        match idempotency {
            Idempotency::Idempotent => self.retry.execute(attempt).await,
            Idempotency::NonIdempotent => attempt().await,
        }
    }
}
