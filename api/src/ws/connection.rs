//! WebSocket connection handles and the connection registry.
//!
//! A [`Connection`] is a cheap, cloneable handle onto one live client channel.
//! The [`ConnectionRegistry`] owns the set of open connections; removing a
//! connection from it also purges the connection from the
//! [`SubscriptionIndex`].

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use serde::Serialize;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, watch, RwLock};
use tracing::debug;

use super::subscriptions::SubscriptionIndex;

/// Global connection ID counter.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a connection for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates the next unique connection ID.
    #[must_use]
    pub fn next() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle state of a connection.
///
/// Transitions only move forward: `Connecting -> Open -> Closed`, or
/// `Connecting -> Closed` when the handshake never completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake in progress, not yet admitted.
    Connecting,
    /// Admitted; subscribe and message events are accepted.
    Open,
    /// Terminal.
    Closed,
}

/// Typed failure of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The peer is gone or the connection was already closed.
    #[error("connection closed")]
    Closed,

    /// The outbound queue stayed full for longer than the send timeout.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    /// The event could not be encoded for the wire.
    #[error("failed to serialize outbound event: {0}")]
    Serialization(String),
}

impl SendError {
    /// Returns a short, stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Timeout(_) => "timeout",
            Self::Serialization(_) => "serialization",
        }
    }
}

#[derive(Debug)]
struct ConnectionInner {
    id: ConnectionId,
    sender: mpsc::Sender<Message>,
    state: watch::Sender<ConnectionState>,
}

/// Handle to one live client connection.
///
/// Clones share the same underlying channel and state.
#[derive(Debug, Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl Connection {
    /// Creates a new connection in the `Connecting` state.
    ///
    /// `sender` feeds the task that writes frames to the socket.
    #[must_use]
    pub fn new(sender: mpsc::Sender<Message>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        Self {
            inner: Arc::new(ConnectionInner {
                id: ConnectionId::next(),
                sender,
                state,
            }),
        }
    }

    /// Returns the connection ID.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.inner.id
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Returns true while the connection is admitted and not yet closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Moves `Connecting` to `Open`. Returns false if the connection was not
    /// connecting.
    pub(crate) fn mark_open(&self) -> bool {
        self.inner.state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                *state = ConnectionState::Open;
                true
            } else {
                false
            }
        })
    }

    /// Moves the connection to `Closed`. Returns false if it already was.
    pub(crate) fn mark_closed(&self) -> bool {
        self.inner.state.send_if_modified(|state| {
            if *state == ConnectionState::Closed {
                false
            } else {
                *state = ConnectionState::Closed;
                true
            }
        })
    }

    /// Resolves once the connection reaches the `Closed` state.
    pub async fn closed(&self) {
        let mut state = self.inner.state.subscribe();
        let _ = state
            .wait_for(|state| *state == ConnectionState::Closed)
            .await;
    }

    /// Encodes `message` as a JSON text frame and queues it for delivery.
    ///
    /// Waits at most `timeout` for room in the outbound queue.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Closed`] if the connection is closed or its writer
    /// is gone, [`SendError::Timeout`] if the queue stayed full, and
    /// [`SendError::Serialization`] if the message cannot be encoded.
    pub async fn send<T: Serialize>(&self, message: &T, timeout: Duration) -> Result<(), SendError> {
        if !self.is_open() {
            return Err(SendError::Closed);
        }

        let json = serde_json::to_string(message)
            .map_err(|e| SendError::Serialization(e.to_string()))?;

        self.inner
            .sender
            .send_timeout(Message::Text(json.into()), timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => SendError::Timeout(timeout),
                SendTimeoutError::Closed(_) => SendError::Closed,
            })
    }
}

/// Registry of all currently-open connections.
#[derive(Debug)]
pub struct ConnectionRegistry {
    /// Open connections by ID.
    connections: RwLock<HashMap<ConnectionId, Connection>>,

    /// Index purged on removal.
    subscriptions: Arc<SubscriptionIndex>,
}

impl ConnectionRegistry {
    /// Creates an empty registry bound to the given subscription index.
    #[must_use]
    pub fn new(subscriptions: Arc<SubscriptionIndex>) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            subscriptions,
        }
    }

    /// Records a newly-accepted connection as open.
    ///
    /// A connection that was closed before admission is not recorded.
    pub async fn admit(&self, connection: Connection) {
        connection.mark_open();
        if !connection.is_open() {
            debug!(connection_id = %connection.id(), "Skipping admission of closed connection");
            return;
        }

        let id = connection.id();
        self.connections.write().await.insert(id, connection);
        debug!(connection_id = %id, "Connection admitted");
    }

    /// Closes a connection and removes it from the registry and from every
    /// document it is subscribed to.
    ///
    /// Idempotent: returns false if the connection was not registered.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        let removed = self.connections.write().await.remove(&id);
        let Some(connection) = removed else {
            return false;
        };

        connection.mark_closed();
        let purged = self.subscriptions.unsubscribe_all(id).await;
        debug!(connection_id = %id, purged, "Connection removed");
        true
    }

    /// Closes and removes every registered connection.
    ///
    /// Returns the number of connections removed.
    pub async fn close_all(&self) -> usize {
        let ids: Vec<ConnectionId> = self.connections.read().await.keys().copied().collect();
        let mut removed = 0;
        for id in ids {
            if self.remove(id).await {
                removed += 1;
            }
        }
        removed
    }

    /// Returns the connection with the given ID, if open.
    pub async fn get(&self, id: ConnectionId) -> Option<Connection> {
        self.connections.read().await.get(&id).cloned()
    }

    /// Resolves IDs to open connections, skipping any already removed.
    pub async fn resolve(&self, ids: &[ConnectionId]) -> Vec<Connection> {
        let connections = self.connections.read().await;
        ids.iter()
            .filter_map(|id| connections.get(id).cloned())
            .collect()
    }

    /// Returns true if the connection is registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Returns the number of open connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns true if no connection is open.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
