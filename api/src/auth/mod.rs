//! Bearer-token authentication for the REST routes.
//!
//! Token verification is delegated to an [`Authenticator`]. Handlers take
//! an [`AuthenticatedUser`] argument, which rejects the request with 401
//! before the handler runs if the token is missing or not accepted.

pub mod extractor;
pub mod static_tokens;
pub mod supabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use extractor::AuthenticatedUser;
pub use static_tokens::StaticTokenAuthenticator;
pub use supabase::SupabaseAuthenticator;

/// The user a token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User ID.
    pub id: String,
    /// Email, when the identity provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AuthUser {
    /// Creates a user with only an ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was presented.
    #[error("missing bearer token")]
    MissingToken,

    /// The token was not accepted.
    #[error("invalid token")]
    InvalidToken,

    /// The identity provider could not be reached.
    #[error("identity provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The identity provider answered unexpectedly.
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Verifies bearer tokens.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolves a token to its user.
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError>;
}
