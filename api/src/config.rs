//! Server configuration.
//!
//! Configuration is read from environment variables with sensible defaults
//! and validated before the server starts.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default allowed CORS origins.
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

/// Default bound on a single subscriber send, in milliseconds.
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 5_000;

/// Default per-connection outbound queue capacity.
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;

/// Default timeout for requests to the managed backend, in seconds.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Realtime relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeConfig {
    /// How long one subscriber send may wait for queue space.
    pub send_timeout: Duration,

    /// Capacity of each connection's outbound queue.
    pub outbound_buffer: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_millis(DEFAULT_SEND_TIMEOUT_MS),
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
        }
    }
}

/// Managed backend (Supabase) connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,

    /// Project API key.
    pub api_key: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl SupabaseConfig {
    /// Creates a configuration with the default timeout.
    #[must_use]
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
        }
    }
}

/// Configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,

    /// Realtime relay settings.
    pub realtime: RealtimeConfig,

    /// Managed backend; `None` selects the in-memory store.
    pub supabase: Option<SupabaseConfig>,

    /// Bearer tokens accepted when no managed backend is configured,
    /// mapped to user IDs.
    pub static_tokens: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| (*s).to_string()).collect(),
            realtime: RealtimeConfig::default(),
            supabase: None,
            static_tokens: HashMap::new(),
        }
    }
}

impl ServerConfig {
    /// Creates a new configuration bound to the given address.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Loads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// the resulting configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// the resulting configuration is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("API_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            config.port = parse_var("API_PORT", &port)?;
        }
        if let Some(origins) = lookup("API_CORS_ORIGINS") {
            config.cors_origins = split_list(&origins);
        }
        if let Some(ms) = lookup("WS_SEND_TIMEOUT_MS") {
            config.realtime.send_timeout = Duration::from_millis(parse_var("WS_SEND_TIMEOUT_MS", &ms)?);
        }
        if let Some(buffer) = lookup("WS_OUTBOUND_BUFFER") {
            config.realtime.outbound_buffer = parse_var("WS_OUTBOUND_BUFFER", &buffer)?;
        }

        if let Some(url) = lookup("SUPABASE_URL") {
            let api_key = lookup("SUPABASE_KEY").ok_or(ConfigError::MissingSupabaseKey)?;
            let mut supabase = SupabaseConfig::new(url, api_key);
            if let Some(secs) = lookup("STORE_TIMEOUT_SECS") {
                supabase.timeout = Duration::from_secs(parse_var("STORE_TIMEOUT_SECS", &secs)?);
            }
            config.supabase = Some(supabase);
        }

        if let Some(tokens) = lookup("API_STATIC_TOKENS") {
            config.static_tokens = parse_static_tokens(&tokens)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Sets the realtime settings.
    #[must_use]
    pub fn with_realtime(mut self, realtime: RealtimeConfig) -> Self {
        self.realtime = realtime;
        self
    }

    /// Sets the managed backend.
    #[must_use]
    pub fn with_supabase(mut self, supabase: SupabaseConfig) -> Self {
        self.supabase = Some(supabase);
        self
    }

    /// Adds an accepted static bearer token.
    #[must_use]
    pub fn with_static_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.static_tokens.insert(token.into(), user_id.into());
        self
    }

    /// Returns the socket address string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.realtime.send_timeout.is_zero() {
            return Err(ConfigError::InvalidSendTimeout);
        }

        if self.realtime.outbound_buffer == 0 {
            return Err(ConfigError::InvalidOutboundBuffer);
        }

        if let Some(supabase) = &self.supabase {
            if !supabase.url.starts_with("http://") && !supabase.url.starts_with("https://") {
                return Err(ConfigError::InvalidSupabaseUrl(supabase.url.clone()));
            }
            if supabase.api_key.is_empty() {
                return Err(ConfigError::MissingSupabaseKey);
            }
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_static_tokens(value: &str) -> Result<HashMap<String, String>, ConfigError> {
    split_list(value)
        .into_iter()
        .map(|pair| match pair.split_once(':') {
            Some((token, user)) if !token.is_empty() && !user.is_empty() => {
                Ok((token.to_string(), user.to_string()))
            }
            _ => Err(ConfigError::InvalidValue {
                name: "API_STATIC_TOKENS",
                value: pair,
            }),
        })
        .collect()
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },

    /// Port zero.
    #[error("port must be > 0")]
    InvalidPort,

    /// Zero send timeout.
    #[error("send timeout must be > 0")]
    InvalidSendTimeout,

    /// Zero outbound buffer.
    #[error("outbound buffer must be > 0")]
    InvalidOutboundBuffer,

    /// Supabase URL without an http(s) scheme.
    #[error("supabase url must start with http:// or https://: {0}")]
    InvalidSupabaseUrl(String),

    /// Supabase URL configured without a key.
    #[error("SUPABASE_KEY is required when SUPABASE_URL is set")]
    MissingSupabaseKey,
}
