//! WebSocket message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Document;

/// Message sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Follow a document (or a project, to hear about new documents in it).
    SubscribeDocument {
        /// Document or project ID.
        doc_id: String,
    },

    /// A live edit to relay to the document's subscribers.
    DocumentUpdate {
        /// Edited document.
        doc_id: String,
        /// Edit payload.
        content: Value,
        /// Edit timestamp.
        timestamp: Value,
    },
}

/// Event received from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A document was created in a followed project.
    DocumentCreated {
        /// The new document.
        document: Document,
    },

    /// A followed document was updated through the REST API.
    DocumentUpdated {
        /// The document after the update.
        document: Document,
        /// User who made the change.
        updated_by: String,
    },

    /// A live edit from a client following the same document.
    LiveUpdate {
        /// Edit payload.
        content: Value,
        /// Timestamp supplied by the editing client.
        timestamp: Value,
    },
}

impl ServerEvent {
    /// Returns the wire `type` tag.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::DocumentCreated { .. } => "document_created",
            Self::DocumentUpdated { .. } => "document_updated",
            Self::LiveUpdate { .. } => "live_update",
        }
    }

    /// Returns the document carried by the event, if any.
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::DocumentCreated { document } | Self::DocumentUpdated { document, .. } => {
                Some(document)
            }
            Self::LiveUpdate { .. } => None,
        }
    }
}
