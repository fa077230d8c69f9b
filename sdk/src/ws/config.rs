//! WebSocket configuration.

use std::time::Duration;

use super::error::WsError;

/// Default WebSocket URL.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default capacity of the received-event queue.
pub const DEFAULT_EVENT_BUFFER: usize = 1000;

/// WebSocket configuration.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL.
    pub url: String,

    /// Bound on the opening handshake.
    pub connect_timeout: Duration,

    /// Events buffered before the reader waits for the caller.
    pub event_buffer: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl WsConfig {
    /// Creates a new configuration with the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the event buffer capacity.
    #[must_use]
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), WsError> {
        if self.url.is_empty() {
            return Err(WsError::InvalidConfig("url cannot be empty".to_string()));
        }

        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(WsError::InvalidConfig(
                "url must start with ws:// or wss://".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(WsError::InvalidConfig(
                "event_buffer must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = WsConfig::default();
        assert_eq!(config.url, DEFAULT_WS_URL);
        assert_eq!(config.event_buffer, DEFAULT_EVENT_BUFFER);
    }

    #[test]
    fn test_config_builder() {
        let config = WsConfig::new("wss://cms.example.com/ws")
            .with_connect_timeout(Duration::from_secs(2))
            .with_event_buffer(8);
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.event_buffer, 8);
    }

    #[test]
    fn test_config_validate() {
        assert!(WsConfig::new("wss://cms.example.com/ws").validate().is_ok());
        assert!(WsConfig::new("").validate().is_err());
        assert!(WsConfig::new("https://cms.example.com/ws").validate().is_err());
        assert!(WsConfig::default().with_event_buffer(0).validate().is_err());
    }
}
