//! Token verification against Supabase Auth.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{AuthError, AuthUser, Authenticator};
use crate::supabase::SupabaseClient;

/// Resolves tokens by calling `GET /auth/v1/user` with the token as bearer.
#[derive(Debug, Clone)]
pub struct SupabaseAuthenticator {
    client: SupabaseClient,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl SupabaseAuthenticator {
    /// Creates an authenticator using the given gateway.
    #[must_use]
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Authenticator for SupabaseAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let url = self
            .client
            .auth_url("user")
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let response = self.client.http().get(url).bearer_auth(token).send().await?;

        match response.status() {
            status if status.is_success() => {
                let user: UserResponse = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Provider(e.to_string()))?;
                Ok(AuthUser {
                    id: user.id,
                    email: user.email,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidToken),
            status => Err(AuthError::Provider(format!("unexpected status {status}"))),
        }
    }
}
