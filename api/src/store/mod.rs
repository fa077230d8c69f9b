//! Document persistence gateway.
//!
//! Persistence lives in an external managed database; this module only
//! defines the seam the HTTP handlers talk to, plus two implementations:
//!
//! - [`SupabaseStore`]: PostgREST calls against a Supabase project
//! - [`MemoryStore`]: in-process storage for development and tests

pub mod memory;
pub mod supabase;

use async_trait::async_trait;

use crate::models::{Document, DocumentPatch, ListQuery, NewDocument};

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

/// Store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request could not be completed.
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with an error status.
    #[error("store returned {status}: {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The backend answered with something that is not a document row.
    #[error("unexpected store response: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error(transparent)]
    Gateway(#[from] crate::supabase::SupabaseClientError),
}

/// Persistence operations on documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists documents, most recently updated first.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Document>, StoreError>;

    /// Inserts a document and returns the stored row.
    async fn create(&self, document: NewDocument) -> Result<Document, StoreError>;

    /// Applies a patch. Returns `None` if no document has the given ID.
    async fn update(&self, id: &str, patch: DocumentPatch) -> Result<Option<Document>, StoreError>;
}
