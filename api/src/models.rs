//! Document resource types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default status of a new document.
pub const DEFAULT_STATUS: &str = "draft";

/// Default page size for listing.
pub const DEFAULT_LIMIT: u32 = 100;

/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 1000;

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Workflow status, e.g. `draft`.
    pub status: String,
    /// Owning project.
    pub project_id: String,
    /// Creating user.
    pub author_id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCreate {
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Owning project.
    pub project_id: String,
    /// Initial status.
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// Request body for updating a document. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpdate {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A document ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDocument {
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Owning project.
    pub project_id: String,
    /// Initial status.
    pub status: String,
    /// Creating user.
    pub author_id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Same as `created_at` on insert.
    pub updated_at: DateTime<Utc>,
}

impl NewDocument {
    /// Stamps a create request with its author and the current time.
    #[must_use]
    pub fn from_request(request: DocumentCreate, author_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            title: request.title,
            body: request.body,
            project_id: request.project_id,
            status: request.status,
            author_id: author_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update ready to be applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Update time.
    pub updated_at: DateTime<Utc>,
}

impl From<DocumentUpdate> for DocumentPatch {
    fn from(update: DocumentUpdate) -> Self {
        Self {
            title: update.title,
            body: update.body,
            status: update.status,
            updated_at: Utc::now(),
        }
    }
}

/// Query parameters for listing documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Rows to skip.
    #[serde(default)]
    pub skip: u32,
    /// Page size.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Case-insensitive match on title or body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            search: None,
        }
    }
}

impl ListQuery {
    /// Returns the page size clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Returns the search term, if any and not blank.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_create_default_status() {
        let request: DocumentCreate =
            serde_json::from_str(r#"{"title":"T","body":"B","project_id":"p1"}"#).expect("parse");
        assert_eq!(request.status, DEFAULT_STATUS);
    }

    #[test]
    fn test_new_document_from_request() {
        let request = DocumentCreate {
            title: "T".to_string(),
            body: "B".to_string(),
            project_id: "p1".to_string(),
            status: "review".to_string(),
        };
        let doc = NewDocument::from_request(request, "user-1");
        assert_eq!(doc.author_id, "user-1");
        assert_eq!(doc.status, "review");
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[test]
    fn test_document_patch_skips_absent_fields() {
        let patch = DocumentPatch::from(DocumentUpdate {
            title: Some("New".to_string()),
            ..Default::default()
        });
        let value = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(value["title"], "New");
        assert!(value.get("body").is_none());
        assert!(value.get("status").is_none());
        assert!(value.get("updated_at").is_some());
    }

    #[test]
    fn test_list_query_defaults_and_clamp() {
        let query: ListQuery = serde_json::from_str("{}").expect("parse");
        assert_eq!(query, ListQuery::default());

        let query = ListQuery {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), 1);

        let query = ListQuery {
            limit: 50_000,
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), MAX_LIMIT);
    }

    #[test]
    fn test_list_query_search_term() {
        let query = ListQuery {
            search: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), None);

        let query = ListQuery {
            search: Some(" roadmap ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), Some("roadmap"));
    }
}
