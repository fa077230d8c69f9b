//! # docrelay API
//!
//! REST and WebSocket server for collaborative documents.
//!
//! Document CRUD is passed through to a [`store::DocumentStore`]; successful
//! writes, and live edits sent by clients, are fanned out over WebSocket to
//! every connection subscribed to the affected document.
//!
//! ## Endpoints
//!
//! - `GET /health`
//! - `GET /api/documents`, `POST /api/documents`
//! - `PUT /api/documents/{document_id}`
//! - `GET /ws`
//!
//! ## Example
//!
//! ```rust,no_run
//! use docrelay_api::{AppState, Server, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let state = AppState::from_config(&config)?;
//! Server::new(config, state).run().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
pub mod supabase;
pub mod ws;

pub use config::{ConfigError, RealtimeConfig, ServerConfig, SupabaseConfig};
pub use error::ApiError;
pub use server::Server;
pub use state::AppState;
