//! WebSocket message types.
//!
//! Defines the JSON frames exchanged with live clients. Every frame is an
//! object with a `type` field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::subscriptions::DocumentId;
use crate::models::Document;

/// An outbound event the broadcaster can fan out.
///
/// Events are encoded once per recipient at send time.
pub trait Event: Serialize + Sync {
    /// Returns the wire `type` tag, used in logs.
    fn event_type(&self) -> &'static str;
}

/// Why an inbound frame was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InboundError {
    /// Not JSON, not an object with a string `type`, or missing fields.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Well-formed, but the `type` is not one the server handles.
    #[error("unknown message type: {0}")]
    UnknownType(String),
}

/// Message sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe this connection to a document.
    SubscribeDocument {
        /// Document to follow.
        doc_id: DocumentId,
    },

    /// A live edit, relayed to every subscriber of the document.
    DocumentUpdate {
        /// Edited document.
        doc_id: DocumentId,
        /// Edit payload, relayed verbatim.
        content: Value,
        /// Client-supplied timestamp, relayed verbatim.
        timestamp: Value,
    },
}

impl ClientMessage {
    /// Message types the server recognizes.
    pub const KNOWN_TYPES: [&'static str; 2] = ["subscribe_document", "document_update"];

    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`InboundError::UnknownType`] for a well-formed frame whose
    /// `type` is not recognized, and [`InboundError::Malformed`] for anything
    /// else that does not decode.
    pub fn parse(text: &str) -> Result<Self, InboundError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| InboundError::Malformed(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| InboundError::Malformed("missing string field `type`".to_string()))?;

        if !Self::KNOWN_TYPES.contains(&kind) {
            return Err(InboundError::UnknownType(kind.to_string()));
        }

        serde_json::from_value(value).map_err(|e| InboundError::Malformed(e.to_string()))
    }
}

/// Message sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A document was created in a project the client follows.
    DocumentCreated {
        /// Stored document row.
        document: Document,
    },

    /// A followed document was updated through the API.
    DocumentUpdated {
        /// Stored document row after the update.
        document: Document,
        /// ID of the user who made the change.
        updated_by: String,
    },

    /// Relay of another client's live edit.
    LiveUpdate {
        /// Edit payload.
        content: Value,
        /// Timestamp supplied by the editing client.
        timestamp: Value,
    },
}

impl ServerMessage {
    /// Creates a document created message.
    #[must_use]
    pub fn document_created(document: Document) -> Self {
        Self::DocumentCreated { document }
    }

    /// Creates a document updated message.
    #[must_use]
    pub fn document_updated(document: Document, updated_by: impl Into<String>) -> Self {
        Self::DocumentUpdated {
            document,
            updated_by: updated_by.into(),
        }
    }

    /// Creates a live update message.
    #[must_use]
    pub fn live_update(content: Value, timestamp: Value) -> Self {
        Self::LiveUpdate { content, timestamp }
    }

}

impl Event for ServerMessage {
    fn event_type(&self) -> &'static str {
        match self {
            Self::DocumentCreated { .. } => "document_created",
            Self::DocumentUpdated { .. } => "document_updated",
            Self::LiveUpdate { .. } => "live_update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_subscribe_document() {
        let msg = ClientMessage::parse(r#"{"type":"subscribe_document","doc_id":"doc-42"}"#)
            .expect("parse");
        assert_eq!(
            msg,
            ClientMessage::SubscribeDocument {
                doc_id: DocumentId::from("doc-42")
            }
        );
    }

    #[test]
    fn test_parse_document_update() {
        let msg = ClientMessage::parse(
            r#"{"type":"document_update","doc_id":"doc-7","content":"hello","timestamp":"t1"}"#,
        )
        .expect("parse");
        match msg {
            ClientMessage::DocumentUpdate {
                doc_id,
                content,
                timestamp,
            } => {
                assert_eq!(doc_id.as_str(), "doc-7");
                assert_eq!(content, json!("hello"));
                assert_eq!(timestamp, json!("t1"));
            }
            _ => panic!("Expected DocumentUpdate"),
        }
    }

    #[test]
    fn test_parse_document_update_numeric_timestamp() {
        let msg = ClientMessage::parse(
            r#"{"type":"document_update","doc_id":"d","content":{"ops":[1]},"timestamp":1700000000000}"#,
        )
        .expect("parse");
        assert!(matches!(
            msg,
            ClientMessage::DocumentUpdate { timestamp, .. } if timestamp == json!(1_700_000_000_000_u64)
        ));
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = ClientMessage::parse(r#"{"type":"cursor_move","x":1}"#).expect_err("unknown");
        assert_eq!(err, InboundError::UnknownType("cursor_move".to_string()));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = ClientMessage::parse("not json").expect_err("malformed");
        assert!(matches!(err, InboundError::Malformed(_)));
    }

    #[test]
    fn test_parse_missing_type() {
        let err = ClientMessage::parse(r#"{"doc_id":"doc-1"}"#).expect_err("malformed");
        assert!(matches!(err, InboundError::Malformed(_)));
    }

    #[test]
    fn test_parse_missing_required_field() {
        let err = ClientMessage::parse(r#"{"type":"document_update","doc_id":"doc-1"}"#)
            .expect_err("malformed");
        assert!(matches!(err, InboundError::Malformed(_)));

        let err = ClientMessage::parse(r#"{"type":"subscribe_document"}"#).expect_err("malformed");
        assert!(matches!(err, InboundError::Malformed(_)));
    }

    fn document() -> Document {
        serde_json::from_value(json!({
            "id": "d1",
            "title": "Roadmap",
            "body": "Q3",
            "status": "draft",
            "project_id": "project-1",
            "author_id": "user-1",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-02T00:00:00Z"
        }))
        .expect("document")
    }

    #[test]
    fn test_server_message_document_created() {
        let msg = ServerMessage::document_created(document());
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(value["type"], "document_created");
        assert_eq!(value["document"]["id"], "d1");
        assert_eq!(value["document"]["project_id"], "project-1");
        assert_eq!(value["document"]["updated_at"], "2026-01-02T00:00:00Z");
        assert_eq!(msg.event_type(), "document_created");
    }

    #[test]
    fn test_server_message_document_updated() {
        let msg = ServerMessage::document_updated(document(), "user-2");
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(value["type"], "document_updated");
        assert_eq!(value["document"]["title"], "Roadmap");
        assert_eq!(value["updated_by"], "user-2");
        assert_eq!(msg.event_type(), "document_updated");
    }

    #[test]
    fn test_server_message_live_update() {
        let msg = ServerMessage::live_update(json!("hello"), json!("t1"));
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(
            value,
            json!({"type": "live_update", "content": "hello", "timestamp": "t1"})
        );
        assert_eq!(msg.event_type(), "live_update");
    }
}
