//! HTTP client implementation.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use super::config::ClientConfig;
use super::error::ClientError;
use crate::types::{Document, DocumentChanges, DocumentQuery, NewDocument};

/// Delay before the first retry.
const BASE_BACKOFF: Duration = Duration::from_millis(200);

/// Longest delay between retries.
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// API error response format.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: String,
}

/// HTTP client for the documents API.
#[derive(Debug, Clone)]
pub struct DocumentsClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl DocumentsClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref token) = config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientError::InvalidConfig("token is not a valid header value".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(&config.user_agent)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self { config, http })
    }

    /// Creates a client for `base_url` authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(ClientConfig::new(base_url).with_token(token))
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Builds the URL of one document, percent-encoding its ID as a single
    /// path segment.
    fn document_url(&self, document_id: &str) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.config.base_url)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidConfig("base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["api", "documents", document_id]);
        Ok(url)
    }

    /// Sends a request, retrying timeouts when `idempotent`.
    async fn execute<T, F>(&self, idempotent: bool, request_fn: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let max_retries = if idempotent { self.config.max_retries } else { 0 };
        let mut retry_count = 0;

        loop {
            match request_fn().send().await {
                Ok(resp) => return Self::decode(resp).await,
                Err(e) if e.is_timeout() && retry_count < max_retries => {
                    tokio::time::sleep(backoff(retry_count)).await;
                    retry_count += 1;
                }
                Err(e) => return Err(ClientError::from(e)),
            }
        }
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();

        if status.is_success() {
            let body = resp
                .text()
                .await
                .map_err(|e| ClientError::Deserialization(e.to_string()))?;
            return serde_json::from_str(&body)
                .map_err(|e| ClientError::Deserialization(e.to_string()));
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(message));
        }

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Lists documents, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_documents(&self, query: &DocumentQuery) -> Result<Vec<Document>, ClientError> {
        let url = reqwest::Url::parse_with_params(
            &self.url("/api/documents"),
            query.to_params().iter().map(|(k, v)| (*k, v.as_str())),
        )
        .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        self.execute(true, || self.http.get(url.clone())).await
    }

    /// Creates a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_document(&self, document: &NewDocument) -> Result<Document, ClientError> {
        let url = self.url("/api/documents");
        self.execute(false, || self.http.post(&url).json(document)).await
    }

    /// Updates a document.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if no document has the given ID.
    pub async fn update_document(
        &self,
        document_id: &str,
        changes: &DocumentChanges,
    ) -> Result<Document, ClientError> {
        let url = self.document_url(document_id)?;
        self.execute(true, || self.http.put(url.clone()).json(changes)).await
    }

    /// Checks that the server is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let url = self.url("/health");
        self.execute(true, || self.http.get(&url)).await
    }
}

/// Exponential backoff before retry `attempt` (zero-based), capped at
/// [`MAX_BACKOFF`].
fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF
        .checked_mul(2_u32.saturating_pow(attempt))
        .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
}
