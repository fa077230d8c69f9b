//! # docrelay
//!
//! Document CRUD backend with real-time edit relay over WebSockets.
//!
//! This crate re-exports the workspace members:
//!
//! - [`api`]: the HTTP and WebSocket server
//! - [`sdk`]: REST and live-update clients

pub use docrelay_api as api;
pub use docrelay_sdk as sdk;

pub use docrelay_api::{AppState, Server, ServerConfig};
pub use docrelay_sdk::{DocumentsClient, LiveClient};
