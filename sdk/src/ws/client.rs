//! WebSocket client implementation.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::config::WsConfig;
use super::error::WsError;
use super::messages::{ClientMessage, ServerEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Client for live document updates.
#[derive(Debug)]
pub struct LiveClient {
    config: WsConfig,
    sink: Arc<Mutex<Option<WsSink>>>,
    event_tx: Mutex<Option<mpsc::Sender<ServerEvent>>>,
    event_rx: Arc<Mutex<mpsc::Receiver<ServerEvent>>>,
    connected: Arc<RwLock<bool>>,
}

impl LiveClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: WsConfig) -> Result<Self, WsError> {
        config.validate()?;

        let (event_tx, event_rx) = mpsc::channel(config.event_buffer);

        Ok(Self {
            config,
            sink: Arc::new(Mutex::new(None)),
            event_tx: Mutex::new(Some(event_tx)),
            event_rx: Arc::new(Mutex::new(event_rx)),
            connected: Arc::new(RwLock::new(false)),
        })
    }

    /// Creates a new client with the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_url(url: impl Into<String>) -> Result<Self, WsError> {
        Self::new(WsConfig::new(url))
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Returns true if connected.
    pub async fn is_connected(&self) -> bool {
        *self.connected.read().await
    }

    /// Connects to the server. A client connects at most once; once the
    /// connection ends, [`next_event`](Self::next_event) drains the remaining
    /// events and then reports [`WsError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake fails or times out, or if the
    /// client was already connected.
    pub async fn connect(&self) -> Result<(), WsError> {
        let mut event_tx = self.event_tx.lock().await;
        if event_tx.is_none() {
            return Err(WsError::Connection("client already connected".to_string()));
        }

        let handshake = tokio_tungstenite::connect_async(self.config.url.as_str());
        let (ws_stream, _) = tokio::time::timeout(self.config.connect_timeout, handshake)
            .await
            .map_err(|_| WsError::Connection("handshake timed out".to_string()))?
            .map_err(|e| WsError::Connection(e.to_string()))?;

        let (sink, source) = ws_stream.split();

        *self.sink.lock().await = Some(sink);
        *self.connected.write().await = true;

        if let Some(tx) = event_tx.take() {
            self.spawn_reader(source, tx);
        }

        Ok(())
    }

    /// Spawns the message reader task.
    fn spawn_reader(&self, mut source: WsSource, event_tx: mpsc::Sender<ServerEvent>) {
        let connected = Arc::clone(&self.connected);

        tokio::spawn(async move {
            while let Some(result) = source.next().await {
                match result {
                    Ok(Message::Text(text)) => {
                        if let Ok(event) = serde_json::from_str::<ServerEvent>(&text) {
                            if event_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(Message::Close(_)) | Err(_) => break,
                    _ => {}
                }
            }
            *connected.write().await = false;
        });
    }

    /// Sends a message to the server.
    async fn send(&self, msg: &ClientMessage) -> Result<(), WsError> {
        let json = serde_json::to_string(msg).map_err(|e| WsError::Serialization(e.to_string()))?;

        let mut sink_guard = self.sink.lock().await;
        let sink = sink_guard.as_mut().ok_or(WsError::NotConnected)?;

        sink.send(Message::Text(json.into()))
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))?;

        Ok(())
    }

    /// Subscribes to a document. Subscribing to a project ID delivers
    /// `document_created` events for that project.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be sent.
    pub async fn subscribe_document(&self, doc_id: &str) -> Result<(), WsError> {
        self.send(&ClientMessage::SubscribeDocument {
            doc_id: doc_id.to_string(),
        })
        .await
    }

    /// Sends a live edit for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be sent.
    pub async fn send_document_update(
        &self,
        doc_id: &str,
        content: Value,
        timestamp: Value,
    ) -> Result<(), WsError> {
        self.send(&ClientMessage::DocumentUpdate {
            doc_id: doc_id.to_string(),
            content,
            timestamp,
        })
        .await
    }

    /// Returns the next event, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`WsError::Timeout`] if nothing arrives in time and
    /// [`WsError::Closed`] once the connection is gone and drained.
    pub async fn next_event(&self, timeout: Duration) -> Result<ServerEvent, WsError> {
        let mut rx = self.event_rx.lock().await;
        tokio::time::timeout(timeout, rx.recv())
            .await
            .map_err(|_| WsError::Timeout(timeout))?
            .ok_or(WsError::Closed)
    }

    /// Closes the connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the close frame cannot be sent.
    pub async fn close(&self) -> Result<(), WsError> {
        *self.connected.write().await = false;

        let sink = self.sink.lock().await.take();
        if let Some(mut sink) = sink {
            sink.send(Message::Close(None)).await?;
        }

        Ok(())
    }
}
