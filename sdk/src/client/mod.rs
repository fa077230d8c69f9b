//! HTTP client for the documents REST API.
//!
//! # Example
//!
//! ```rust,ignore
//! use docrelay_sdk::client::DocumentsClient;
//! use docrelay_sdk::types::{DocumentQuery, NewDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DocumentsClient::with_token("http://localhost:8000", "jwt")?;
//!
//!     let doc = client
//!         .create_document(&NewDocument::new("Launch plan", "", "project-1"))
//!         .await?;
//!     let found = client
//!         .list_documents(&DocumentQuery::default().search("launch"))
//!         .await?;
//!     println!("{} matches, created {}", found.len(), doc.id);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::DocumentsClient;
