//! Fixed token table, for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{AuthError, AuthUser, Authenticator};

/// Accepts only the tokens it was configured with.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, String>,
}

impl StaticTokenAuthenticator {
    /// Creates an authenticator from `token -> user_id` pairs.
    #[must_use]
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Adds a token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }

    /// Returns the number of accepted tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if no token is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        self.tokens
            .get(token)
            .map(AuthUser::new)
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_token() {
        let auth = StaticTokenAuthenticator::default().with_token("t1", "user-1");
        let user = auth.authenticate("t1").await.expect("authenticate");
        assert_eq!(user.id, "user-1");
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let auth = StaticTokenAuthenticator::default().with_token("t1", "user-1");
        assert!(matches!(
            auth.authenticate("t2").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_empty_rejects_everything() {
        let auth = StaticTokenAuthenticator::default();
        assert!(auth.is_empty());
        assert!(auth.authenticate("").await.is_err());
    }
}
