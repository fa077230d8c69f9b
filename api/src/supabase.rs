//! HTTP gateway to a Supabase project.
//!
//! Shared by the document store (PostgREST under `/rest/v1`) and the token
//! authenticator (GoTrue under `/auth/v1`).

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Url;

use crate::config::SupabaseConfig;

/// Header carrying the project API key on every request.
pub const API_KEY_HEADER: &str = "apikey";

/// Thin wrapper around a configured `reqwest` client.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    config: SupabaseConfig,
    http: reqwest::Client,
}

impl SupabaseClient {
    /// Creates a client for the given project.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client cannot be created.
    pub fn new(config: SupabaseConfig) -> Result<Self, SupabaseClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| SupabaseClientError::InvalidApiKey)?;
        headers.insert(API_KEY_HEADER, key);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(format!("docrelay-api/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SupabaseClientError::Build)?;

        Ok(Self { config, http })
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns the project API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    /// Builds a PostgREST URL for `table` with encoded query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL does not parse.
    pub fn rest_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, SupabaseClientError> {
        let base = format!("{}/rest/v1/{}", self.config.url, table);
        Url::parse_with_params(&base, params.iter().map(|(k, v)| (*k, v.as_str())))
            .map_err(|e| SupabaseClientError::InvalidUrl(e.to_string()))
    }

    /// Builds a GoTrue URL for `path` (e.g. `user`).
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL does not parse.
    pub fn auth_url(&self, path: &str) -> Result<Url, SupabaseClientError> {
        Url::parse(&format!("{}/auth/v1/{}", self.config.url, path))
            .map_err(|e| SupabaseClientError::InvalidUrl(e.to_string()))
    }
}

/// Errors building the gateway or its URLs.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseClientError {
    /// API key contains bytes not allowed in a header.
    #[error("supabase api key is not a valid header value")]
    InvalidApiKey,

    /// The HTTP client could not be created.
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),

    /// A request URL could not be built.
    #[error("invalid supabase url: {0}")]
    InvalidUrl(String),
}
