//! WebSocket client for live document updates.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use docrelay_sdk::ws::LiveClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LiveClient::with_url("ws://localhost:8000/ws")?;
//!     client.connect().await?;
//!     client.subscribe_document("doc-42").await?;
//!
//!     loop {
//!         let event = client.next_event(Duration::from_secs(30)).await?;
//!         println!("{}: {:?}", event.event_type(), event);
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod messages;

pub use client::LiveClient;
pub use config::WsConfig;
pub use error::WsError;
pub use messages::{ClientMessage, ServerEvent};
