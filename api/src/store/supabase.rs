//! Document store backed by a Supabase `documents` table.

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{DocumentStore, StoreError};
use crate::models::{Document, DocumentPatch, ListQuery, NewDocument};
use crate::supabase::SupabaseClient;

/// Table holding document rows.
pub const DOCUMENTS_TABLE: &str = "documents";

/// Asks PostgREST to return the written rows.
const RETURN_REPRESENTATION: &str = "return=representation";

/// PostgREST-backed document store.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: SupabaseClient,
}

impl SupabaseStore {
    /// Creates a store using the given gateway.
    #[must_use]
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Returns the gateway.
    #[must_use]
    pub fn client(&self) -> &SupabaseClient {
        &self.client
    }
}

/// Builds the PostgREST query parameters for a listing.
pub(crate) fn list_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", "*".to_string()),
        ("order", "updated_at.desc".to_string()),
        ("offset", query.skip.to_string()),
        ("limit", query.effective_limit().to_string()),
    ];
    if let Some(term) = query.search_term() {
        let pattern = ilike_pattern(term);
        params.push((
            "or",
            format!("(title.ilike.{pattern},body.ilike.{pattern})"),
        ));
    }
    params
}

/// Quotes a search term as a PostgREST `ilike` substring pattern.
fn ilike_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"*{escaped}*\"")
}

/// Decodes a successful response body, mapping error statuses to
/// [`StoreError::Backend`].
async fn decode_rows<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(StoreError::Backend {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl DocumentStore for SupabaseStore {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Document>, StoreError> {
        let url = self.client.rest_url(DOCUMENTS_TABLE, &list_params(query))?;
        debug!(%url, "Listing documents");

        let response = self
            .client
            .http()
            .get(url)
            .bearer_auth(self.client.api_key())
            .send()
            .await?;
        decode_rows(response).await
    }

    async fn create(&self, document: NewDocument) -> Result<Document, StoreError> {
        let url = self.client.rest_url(DOCUMENTS_TABLE, &[])?;

        let response = self
            .client
            .http()
            .post(url)
            .bearer_auth(self.client.api_key())
            .header("Prefer", HeaderValue::from_static(RETURN_REPRESENTATION))
            .json(&document)
            .send()
            .await?;

        let rows: Vec<Document> = decode_rows(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn update(&self, id: &str, patch: DocumentPatch) -> Result<Option<Document>, StoreError> {
        let url = self
            .client
            .rest_url(DOCUMENTS_TABLE, &[("id", format!("eq.{id}"))])?;

        let response = self
            .client
            .http()
            .patch(url)
            .bearer_auth(self.client.api_key())
            .header("Prefer", HeaderValue::from_static(RETURN_REPRESENTATION))
            .json(&patch)
            .send()
            .await?;

        let rows: Vec<Document> = decode_rows(response).await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_list_params_defaults() {
        let params = list_params(&ListQuery::default());
        assert_eq!(param(&params, "select"), Some("*"));
        assert_eq!(param(&params, "order"), Some("updated_at.desc"));
        assert_eq!(param(&params, "offset"), Some("0"));
        assert_eq!(param(&params, "limit"), Some("100"));
        assert_eq!(param(&params, "or"), None);
    }

    #[test]
    fn test_list_params_search() {
        let params = list_params(&ListQuery {
            skip: 20,
            limit: 5000,
            search: Some("road map".to_string()),
        });
        assert_eq!(param(&params, "offset"), Some("20"));
        assert_eq!(param(&params, "limit"), Some("1000"));
        assert_eq!(
            param(&params, "or"),
            Some("(title.ilike.\"*road map*\",body.ilike.\"*road map*\")")
        );
    }

    #[test]
    fn test_ilike_pattern_escapes_quotes() {
        assert_eq!(ilike_pattern("a\"b"), "\"*a\\\"b*\"");
    }
}
