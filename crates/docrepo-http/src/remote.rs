//! Remote storage backend over HTTP
//!
//! Records live under `{base}/records/{key}`. Listing is a `GET` on
//! `{base}/records?prefix=...` answering `{"keys": [...]}`.

use std::sync::Arc;

use async_trait::async_trait;
use docrepo_storage::{AccessMode, Result, StorageBackend, StorageError};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, IF_NONE_MATCH},
    Method, Response, StatusCode,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    client::{HttpClient, HttpClientTrait, Idempotency},
    config::HttpConfig,
    credential::{CredentialProvider, StaticCredential, CREDENTIAL_HEADER},
    error::HttpError,
};

/// Header carrying the access mode of a `PUT`
pub const ACCESS_MODE_HEADER: &str = "x-access-mode";

#[derive(Debug, Deserialize)]
struct KeyListing {
    keys: Vec<String>,
}

/// Storage backend talking to a remote record service
pub struct RemoteBackend {
    base_url: String,
    client: Arc<dyn HttpClientTrait>,
    credentials: Arc<dyn CredentialProvider>,
}

impl RemoteBackend {
    /// Create a backend over an existing client and credential source
    pub fn new(
        base_url: &str,
        client: Arc<dyn HttpClientTrait>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> crate::Result<Self> {
        let parsed =
            url::Url::parse(base_url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            credentials,
        })
    }

    /// Build a reqwest-backed client from `config` with a fixed credential
    pub fn from_config(
        base_url: &str,
        credential: impl Into<String>,
        config: HttpConfig,
    ) -> crate::Result<Self> {
        let client = HttpClient::new(config)?;
        Self::new(
            base_url,
            Arc::new(client),
            Arc::new(StaticCredential::new(credential)),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn record_url(&self, key: &str) -> String {
        let encoded: Vec<_> = key.split('/').map(urlencoding::encode).collect();
        format!("{}/records/{}", self.base_url, encoded.join("/"))
    }

    fn listing_url(&self, prefix: &str) -> String {
        format!(
            "{}/records?prefix={}",
            self.base_url,
            urlencoding::encode(prefix)
        )
    }

    async fn call(
        &self,
        method: Method,
        url: &str,
        mut headers: HeaderMap,
        body: Option<Vec<u8>>,
        idempotency: Idempotency,
    ) -> Result<Response> {
        let credential = self.credentials.credential().await.map_err(transport)?;
        let value = HeaderValue::from_str(&credential).map_err(|_| {
            transport(HttpError::Credential(
                "credential is not a valid header value".to_string(),
            ))
        })?;
        headers.insert(HeaderName::from_static(CREDENTIAL_HEADER), value);

        self.client
            .send(method, url, headers, body, idempotency)
            .await
            .map_err(transport)
    }
}

fn transport(err: HttpError) -> StorageError {
    StorageError::Transport(err.to_string())
}

async fn unexpected(key: &str, response: Response) -> StorageError {
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::BAD_REQUEST {
        StorageError::BadRequest {
            key: key.to_string(),
            message,
        }
    } else {
        StorageError::Status {
            key: key.to_string(),
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl StorageBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn key_exists(&self, key: &str) -> Result<bool> {
        let response = self
            .call(
                Method::HEAD,
                &self.record_url(key),
                HeaderMap::new(),
                None,
                Idempotency::Idempotent,
            )
            .await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(unexpected(key, response).await),
        }
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let response = self
            .call(
                Method::GET,
                &self.record_url(key),
                HeaderMap::new(),
                None,
                Idempotency::Idempotent,
            )
            .await?;
        match response.status() {
            s if s.is_success() => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| transport(HttpError::RequestFailed(e)))?;
                Ok(Some(bytes.to_vec()))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(unexpected(key, response).await),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8], mode: AccessMode) -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(ACCESS_MODE_HEADER),
            HeaderValue::from_static(mode.as_str()),
        );
        // a conditional PUT is not safe to replay
        let idempotency = if mode == AccessMode::ReadOnly {
            headers.insert(IF_NONE_MATCH, HeaderValue::from_static("*"));
            Idempotency::NonIdempotent
        } else {
            Idempotency::Idempotent
        };

        let response = self
            .call(
                Method::PUT,
                &self.record_url(key),
                headers,
                Some(bytes.to_vec()),
                idempotency,
            )
            .await?;
        match response.status() {
            s if s.is_success() => {
                debug!(key, %mode, "Stored remote record");
                Ok(())
            }
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                Err(StorageError::key_exists(key))
            }
            _ => Err(unexpected(key, response).await),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let response = self
            .call(
                Method::DELETE,
                &self.record_url(key),
                HeaderMap::new(),
                None,
                Idempotency::NonIdempotent,
            )
            .await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(unexpected(key, response).await),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let response = self
            .call(
                Method::GET,
                &self.listing_url(prefix),
                HeaderMap::new(),
                None,
                Idempotency::Idempotent,
            )
            .await?;
        if !response.status().is_success() {
            return Err(unexpected(prefix, response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport(HttpError::RequestFailed(e)))?;
        let listing: KeyListing = serde_json::from_slice(&body).map_err(|e| {
            StorageError::MalformedResponse(format!("listing for '{prefix}': {e}"))
        })?;
        Ok(listing.keys)
    }
}
