//! WebSocket module for live document updates.
//!
//! Clients connect to `/ws`, subscribe to documents, and receive every event
//! broadcast for those documents: API writes and other clients' live edits.
//!
//! # Components
//!
//! - [`ConnectionRegistry`]: open connections; removal purges subscriptions
//! - [`SubscriptionIndex`]: document → subscribed connections
//! - [`Broadcaster`]: snapshot-then-send fan-out with per-send timeouts
//!
//! # Message Types
//!
//! - `subscribe_document` / `document_update`: inbound
//! - `document_created` / `document_updated` / `live_update`: outbound

pub mod broadcaster;
pub mod connection;
pub mod handler;
pub mod messages;
pub mod metrics;
pub mod subscriptions;

pub use broadcaster::{BroadcastOutcome, Broadcaster};
pub use connection::{Connection, ConnectionId, ConnectionRegistry, ConnectionState, SendError};
pub use handler::{ws_handler, WsState};
pub use messages::{ClientMessage, Event, InboundError, ServerMessage};
pub use metrics::{WsMetrics, WsMetricsSnapshot};
pub use subscriptions::{DocumentId, SubscriptionIndex};
