//! Document subscription index.
//!
//! Maps document IDs to the connections subscribed to them, with a reverse
//! index so a connection can be purged without scanning every document.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::connection::{Connection, ConnectionId};

/// Opaque document identifier used as the subscription key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a document ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Default)]
struct Subscriptions {
    /// Document to subscribed connections.
    by_document: HashMap<DocumentId, HashSet<ConnectionId>>,

    /// Connection to the documents it is subscribed to.
    by_connection: HashMap<ConnectionId, HashSet<DocumentId>>,
}

/// Manages document subscriptions for all connections.
///
/// Both directions of the mapping live behind one lock so readers never see
/// them disagree.
#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    inner: RwLock<Subscriptions>,
}

impl SubscriptionIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a document.
    ///
    /// Returns true if the subscription was added; false if it already
    /// existed or the connection is not open.
    pub async fn subscribe(&self, connection: &Connection, document: DocumentId) -> bool {
        let mut guard = self.inner.write().await;

        // Checked under the lock: removal marks the connection closed before
        // purging, so a subscribe racing with removal either lands before the
        // purge or sees the closed state.
        if !connection.is_open() {
            return false;
        }

        let subs = &mut *guard;
        let id = connection.id();
        let added = subs
            .by_document
            .entry(document.clone())
            .or_default()
            .insert(id);
        if added {
            subs.by_connection.entry(id).or_default().insert(document);
        }
        added
    }

    /// Removes a connection from every document it is subscribed to.
    ///
    /// Returns the number of subscriptions removed.
    pub async fn unsubscribe_all(&self, connection_id: ConnectionId) -> usize {
        let mut guard = self.inner.write().await;
        let subs = &mut *guard;

        let Some(documents) = subs.by_connection.remove(&connection_id) else {
            return 0;
        };

        for document in &documents {
            let now_empty = match subs.by_document.get_mut(document) {
                Some(connections) => {
                    connections.remove(&connection_id);
                    connections.is_empty()
                }
                None => false,
            };
            if now_empty {
                subs.by_document.remove(document);
            }
        }

        documents.len()
    }

    /// Returns a snapshot of the connections subscribed to a document.
    pub async fn subscribers_of(&self, document: &DocumentId) -> Vec<ConnectionId> {
        let subs = self.inner.read().await;
        subs.by_document
            .get(document)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the documents a connection is subscribed to.
    pub async fn documents_of(&self, connection_id: ConnectionId) -> Vec<DocumentId> {
        let subs = self.inner.read().await;
        subs.by_connection
            .get(&connection_id)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the number of subscribers for a document.
    pub async fn subscriber_count(&self, document: &DocumentId) -> usize {
        let subs = self.inner.read().await;
        subs.by_document.get(document).map_or(0, HashSet::len)
    }

    /// Returns the number of documents with at least one subscriber.
    pub async fn document_count(&self) -> usize {
        self.inner.read().await.by_document.len()
    }

    /// Returns the total number of subscriptions.
    pub async fn total_subscriptions(&self) -> usize {
        let subs = self.inner.read().await;
        subs.by_document.values().map(HashSet::len).sum()
    }
}
