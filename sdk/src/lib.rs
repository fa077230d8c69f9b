//! docrelay SDK - Rust client library for the docrelay API.
//!
//! # Clients
//!
//! - [`DocumentsClient`]: list, create and update documents over REST
//! - [`LiveClient`]: follow documents and exchange live edits over WebSocket
//!
//! # Types
//!
//! - [`Document`]: a stored document
//! - [`NewDocument`], [`DocumentChanges`]: write payloads
//! - [`DocumentQuery`]: listing parameters
//! - [`ServerEvent`]: events pushed to live clients
//!
//! # Example
//!
//! ```rust,ignore
//! use docrelay_sdk::{DocumentChanges, DocumentsClient};
//!
//! let client = DocumentsClient::with_token("http://localhost:8000", "jwt")?;
//! let doc = client
//!     .update_document("doc-42", &DocumentChanges::default().status("published"))
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod types;
pub mod ws;

pub use client::{ClientConfig, ClientError, DocumentsClient};
pub use error::SdkError;
pub use types::{Document, DocumentChanges, DocumentQuery, NewDocument};
pub use ws::{LiveClient, ServerEvent, WsConfig, WsError};
