//! WebSocket connection handler.
//!
//! Provides the upgrade handler and the per-connection message loop.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::broadcaster::Broadcaster;
use super::connection::{Connection, ConnectionRegistry};
use super::messages::{ClientMessage, InboundError, ServerMessage};
use super::metrics::WsMetrics;
use super::subscriptions::SubscriptionIndex;
use crate::config::RealtimeConfig;

/// Realtime state shared across connections and API handlers.
#[derive(Debug, Clone)]
pub struct WsState {
    /// Open connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Document subscriptions.
    pub subscriptions: Arc<SubscriptionIndex>,
    /// Event fan-out.
    pub broadcaster: Broadcaster,
    /// Metrics.
    pub metrics: Arc<WsMetrics>,
    /// Per-connection settings.
    pub config: RealtimeConfig,
}

impl WsState {
    /// Creates a new realtime state.
    #[must_use]
    pub fn new(config: RealtimeConfig) -> Self {
        let subscriptions = Arc::new(SubscriptionIndex::new());
        let registry = Arc::new(ConnectionRegistry::new(Arc::clone(&subscriptions)));
        let metrics = Arc::new(WsMetrics::new());
        let broadcaster = Broadcaster::new(
            Arc::clone(&registry),
            Arc::clone(&subscriptions),
            Arc::clone(&metrics),
            config.send_timeout,
        );

        Self {
            registry,
            subscriptions,
            broadcaster,
            metrics,
            config,
        }
    }
}

impl Default for WsState {
    fn default() -> Self {
        Self::new(RealtimeConfig::default())
    }
}

/// WebSocket upgrade handler.
///
/// Upgrades an HTTP connection to a WebSocket connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_connection(socket, state))
}

/// Handles a WebSocket connection from admission to removal.
async fn handle_connection(socket: WebSocket, state: WsState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Outgoing frames are queued here and written by a dedicated task
    let (tx, mut rx) = mpsc::channel::<Message>(state.config.outbound_buffer);

    let connection = Connection::new(tx);
    let connection_id = connection.id();
    state.registry.admit(connection.clone()).await;
    state.metrics.record_connection_opened();
    info!(%connection_id, "WebSocket connection opened");

    let metrics = Arc::clone(&state.metrics);
    let mut sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = ws_sender.send(msg).await {
                debug!("WebSocket write failed: {}", e);
                break;
            }
            metrics.record_message_sent();
        }
    });

    loop {
        tokio::select! {
            incoming = ws_receiver.next() => {
                let msg = match incoming {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        warn!(%connection_id, "WebSocket error: {}", e);
                        state.metrics.record_error();
                        break;
                    }
                    None => break,
                };

                state.metrics.record_message_received();

                match msg {
                    Message::Text(text) => {
                        handle_text_message(text.as_str(), &connection, &state).await;
                    }
                    Message::Close(_) => {
                        info!(%connection_id, "WebSocket close requested");
                        break;
                    }
                    Message::Binary(_) => {
                        debug!(%connection_id, "Ignoring binary frame");
                    }
                    Message::Ping(_) | Message::Pong(_) => {}
                }
            }
            () = connection.closed() => {
                debug!(%connection_id, "Connection closed by server");
                break;
            }
            _ = &mut sender_task => {
                debug!(%connection_id, "Writer task finished");
                break;
            }
        }
    }

    // Cleanup
    state.registry.remove(connection_id).await;
    state.metrics.record_connection_closed();
    sender_task.abort();

    info!(%connection_id, "WebSocket connection closed");
}

/// Handles a text frame from the client.
///
/// Unknown and malformed frames are dropped; the connection stays open.
async fn handle_text_message(text: &str, connection: &Connection, state: &WsState) {
    let connection_id = connection.id();

    if !connection.is_open() {
        debug!(%connection_id, "Dropping message on closed connection");
        return;
    }

    match ClientMessage::parse(text) {
        Ok(ClientMessage::SubscribeDocument { doc_id }) => {
            if state.subscriptions.subscribe(connection, doc_id.clone()).await {
                state.metrics.record_subscription();
                debug!(%connection_id, %doc_id, "Subscribed to document");
            } else {
                debug!(%connection_id, %doc_id, "Subscription unchanged");
            }
        }
        Ok(ClientMessage::DocumentUpdate {
            doc_id,
            content,
            timestamp,
        }) => {
            let event = ServerMessage::live_update(content, timestamp);
            state.broadcaster.broadcast(&doc_id, &event).await;
        }
        Err(InboundError::UnknownType(kind)) => {
            state.metrics.record_unknown();
            debug!(%connection_id, %kind, "Ignoring unknown message type");
        }
        Err(InboundError::Malformed(reason)) => {
            state.metrics.record_malformed();
            warn!(%connection_id, %reason, "Dropping malformed message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::subscriptions::DocumentId;
    use serde_json::{json, Value};

    async fn open(state: &WsState) -> (Connection, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(10);
        let connection = Connection::new(tx);
        state.registry.admit(connection.clone()).await;
        (connection, rx)
    }

    fn next_json(rx: &mut mpsc::Receiver<Message>) -> Option<Value> {
        match rx.try_recv() {
            Ok(Message::Text(text)) => serde_json::from_str(text.as_str()).ok(),
            _ => None,
        }
    }

    #[test]
    fn test_ws_state_new() {
        let state = WsState::default();
        assert_eq!(state.metrics.connections_opened(), 0);
        assert_eq!(state.broadcaster.send_timeout(), state.config.send_timeout);
    }

    #[tokio::test]
    async fn test_handle_subscribe() {
        let state = WsState::default();
        let (connection, _rx) = open(&state).await;

        handle_text_message(
            r#"{"type":"subscribe_document","doc_id":"doc-42"}"#,
            &connection,
            &state,
        )
        .await;

        assert_eq!(
            state.subscriptions.subscribers_of(&DocumentId::from("doc-42")).await,
            vec![connection.id()]
        );
        assert_eq!(state.metrics.subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_handle_document_update_relays_to_subscribers_including_sender() {
        let state = WsState::default();
        let (sender, mut sender_rx) = open(&state).await;
        let (peer, mut peer_rx) = open(&state).await;
        let doc = DocumentId::from("doc-1");
        state.subscriptions.subscribe(&sender, doc.clone()).await;
        state.subscriptions.subscribe(&peer, doc).await;

        handle_text_message(
            r#"{"type":"document_update","doc_id":"doc-1","content":"hello","timestamp":"t1"}"#,
            &sender,
            &state,
        )
        .await;

        let expected = json!({"type": "live_update", "content": "hello", "timestamp": "t1"});
        assert_eq!(next_json(&mut peer_rx), Some(expected.clone()));
        assert_eq!(next_json(&mut sender_rx), Some(expected));
    }

    #[tokio::test]
    async fn test_handle_document_update_without_subscribers() {
        let state = WsState::default();
        let (sender, mut rx) = open(&state).await;

        handle_text_message(
            r#"{"type":"document_update","doc_id":"doc-7","content":"hello","timestamp":"t1"}"#,
            &sender,
            &state,
        )
        .await;

        assert!(next_json(&mut rx).is_none());
        assert_eq!(state.metrics.broadcasts(), 1);
        assert!(sender.is_open());
    }

    #[tokio::test]
    async fn test_handle_unknown_and_malformed_keep_connection_open() {
        let state = WsState::default();
        let (connection, mut rx) = open(&state).await;

        handle_text_message(r#"{"type":"cursor_move"}"#, &connection, &state).await;
        handle_text_message("{not json", &connection, &state).await;
        handle_text_message(r#"{"type":"subscribe_document"}"#, &connection, &state).await;

        assert!(connection.is_open());
        assert!(state.registry.contains(connection.id()).await);
        assert_eq!(state.metrics.unknown_messages(), 1);
        assert_eq!(state.metrics.malformed_messages(), 2);
        assert!(next_json(&mut rx).is_none());
    }

    #[tokio::test]
    async fn test_handle_message_after_close_is_noop() {
        let state = WsState::default();
        let (connection, _rx) = open(&state).await;
        state.registry.remove(connection.id()).await;

        handle_text_message(
            r#"{"type":"subscribe_document","doc_id":"doc-1"}"#,
            &connection,
            &state,
        )
        .await;

        assert_eq!(state.subscriptions.total_subscriptions().await, 0);
        assert_eq!(state.metrics.subscriptions(), 0);
    }
}
