//! Document types as seen by API clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size used by the server.
pub const DEFAULT_LIMIT: u32 = 100;

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Workflow status.
    pub status: String,
    /// Owning project.
    #[serde(default)]
    pub project_id: String,
    /// Creating user.
    #[serde(default)]
    pub author_id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Owning project.
    pub project_id: String,
    /// Initial status; the server defaults to `draft`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl NewDocument {
    /// Creates a draft document.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            project_id: project_id.into(),
            status: None,
        }
    }

    /// Sets the initial status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Fields to change on an existing document. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChanges {
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

impl DocumentChanges {
    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Listing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentQuery {
    /// Rows to skip.
    pub skip: u32,
    /// Page size.
    pub limit: u32,
    /// Case-insensitive match on title or body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for DocumentQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            search: None,
        }
    }
}

impl DocumentQuery {
    /// Sets the page.
    #[must_use]
    pub fn page(mut self, skip: u32, limit: u32) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }

    /// Sets the search term.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Returns the query as URL parameters.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("skip", self.skip.to_string()), ("limit", self.limit.to_string())];
        if let Some(term) = &self.search {
            params.push(("search", term.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_omits_unset_status() {
        let value = serde_json::to_value(NewDocument::new("T", "B", "p1")).expect("serialize");
        assert!(value.get("status").is_none());

        let value =
            serde_json::to_value(NewDocument::new("T", "B", "p1").with_status("review")).expect("serialize");
        assert_eq!(value["status"], "review");
    }

    #[test]
    fn test_changes_only_serialize_set_fields() {
        let value = serde_json::to_value(DocumentChanges::default().title("New")).expect("serialize");
        assert_eq!(value, serde_json::json!({"title": "New"}));
    }

    #[test]
    fn test_query_params() {
        let params = DocumentQuery::default().page(10, 5).search("plan").to_params();
        assert_eq!(
            params,
            vec![
                ("skip", "10".to_string()),
                ("limit", "5".to_string()),
                ("search", "plan".to_string()),
            ]
        );
    }

    #[test]
    fn test_document_tolerates_extra_fields() {
        let json = r#"{
            "id": "d1", "title": "T", "body": "B", "status": "draft",
            "project_id": "p1", "author_id": "u1",
            "created_at": "2026-01-01T00:00:00Z", "updated_at": "2026-01-01T00:00:00Z",
            "version": 3
        }"#;
        let doc: Document = serde_json::from_str(json).expect("parse");
        assert_eq!(doc.id, "d1");
    }
}
