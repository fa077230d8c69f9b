//! Shared application state.

use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, warn};

use crate::auth::{Authenticator, StaticTokenAuthenticator, SupabaseAuthenticator};
use crate::config::ServerConfig;
use crate::store::{DocumentStore, MemoryStore, SupabaseStore};
use crate::supabase::{SupabaseClient, SupabaseClientError};
use crate::ws::WsState;

/// State handed to every handler.
#[derive(Clone, FromRef)]
pub struct AppState {
    /// Document persistence.
    pub store: Arc<dyn DocumentStore>,
    /// Token verification.
    pub auth: Arc<dyn Authenticator>,
    /// Realtime registry, subscriptions and broadcaster.
    pub ws: WsState,
}

impl AppState {
    /// Creates state from explicit collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, auth: Arc<dyn Authenticator>, ws: WsState) -> Self {
        Self { store, auth, ws }
    }

    /// Creates state backed by an in-memory store.
    #[must_use]
    pub fn in_memory(auth: Arc<dyn Authenticator>) -> Self {
        Self::new(Arc::new(MemoryStore::new()), auth, WsState::default())
    }

    /// Creates state for a server configuration.
    ///
    /// With a Supabase project configured, documents and tokens go through
    /// it. Otherwise documents live in memory and only the configured
    /// static tokens are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the Supabase gateway cannot be created.
    pub fn from_config(config: &ServerConfig) -> Result<Self, SupabaseClientError> {
        let ws = WsState::new(config.realtime.clone());

        match &config.supabase {
            Some(supabase) => {
                let client = SupabaseClient::new(supabase.clone())?;
                info!(url = %supabase.url, "Using Supabase document store");
                Ok(Self::new(
                    Arc::new(SupabaseStore::new(client.clone())),
                    Arc::new(SupabaseAuthenticator::new(client)),
                    ws,
                ))
            }
            None => {
                let auth = StaticTokenAuthenticator::new(config.static_tokens.clone());
                if auth.is_empty() {
                    warn!("No Supabase project or static tokens configured; all API calls will be rejected");
                }
                info!(tokens = auth.len(), "Using in-memory document store");
                Ok(Self::new(Arc::new(MemoryStore::new()), Arc::new(auth), ws))
            }
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").field("ws", &self.ws).finish_non_exhaustive()
    }
}
