//! Resource types shared by the REST and WebSocket clients.

pub mod document;

pub use document::{Document, DocumentChanges, DocumentQuery, NewDocument};
