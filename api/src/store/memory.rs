//! In-process document store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError};
use crate::models::{Document, DocumentPatch, ListQuery, NewDocument};

/// Document store backed by a map in memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Document>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Returns true if the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn generate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("doc-{n}")
    }
}

fn matches_search(document: &Document, term: &str) -> bool {
    let term = term.to_lowercase();
    document.title.to_lowercase().contains(&term) || document.body.to_lowercase().contains(&term)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents.read().await;

        let mut matched: Vec<Document> = documents
            .values()
            .filter(|doc| query.search_term().map_or(true, |term| matches_search(doc, term)))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));

        Ok(matched
            .into_iter()
            .skip(query.skip as usize)
            .take(query.effective_limit() as usize)
            .collect())
    }

    async fn create(&self, document: NewDocument) -> Result<Document, StoreError> {
        let stored = Document {
            id: self.generate_id(),
            title: document.title,
            body: document.body,
            status: document.status,
            project_id: document.project_id,
            author_id: document.author_id,
            created_at: document.created_at,
            updated_at: document.updated_at,
        };

        self.documents
            .write()
            .await
            .insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &str, patch: DocumentPatch) -> Result<Option<Document>, StoreError> {
        let mut documents = self.documents.write().await;
        let Some(document) = documents.get_mut(id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            document.title = title;
        }
        if let Some(body) = patch.body {
            document.body = body;
        }
        if let Some(status) = patch.status {
            document.status = status;
        }
        document.updated_at = patch.updated_at;

        Ok(Some(document.clone()))
    }
}
