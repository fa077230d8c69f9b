//! WebSocket metrics tracking.
//!
//! Atomic counters for the relay: connection lifecycle, frame traffic,
//! broadcasts and failed deliveries by cause.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::connection::SendError;

/// Metrics for the WebSocket relay.
#[derive(Debug)]
pub struct WsMetrics {
    /// Total connections opened.
    connections_opened: AtomicU64,

    /// Total connections closed.
    connections_closed: AtomicU64,

    /// Total frames received.
    messages_received: AtomicU64,

    /// Total frames written to sockets.
    messages_sent: AtomicU64,

    /// Total transport errors.
    errors: AtomicU64,

    /// Total subscriptions added.
    subscriptions: AtomicU64,

    /// Total broadcast calls.
    broadcasts: AtomicU64,

    /// Deliveries queued successfully.
    deliveries: AtomicU64,

    /// Deliveries failed because the peer was gone.
    delivery_closed: AtomicU64,

    /// Deliveries failed because the subscriber was too slow.
    delivery_timeouts: AtomicU64,

    /// Deliveries failed because the event could not be encoded.
    delivery_serialization: AtomicU64,

    /// Inbound frames dropped as malformed.
    malformed_messages: AtomicU64,

    /// Inbound frames dropped for an unknown type.
    unknown_messages: AtomicU64,

    /// Start time for rate calculation.
    start_time: Instant,
}

impl Default for WsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl WsMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections_opened: AtomicU64::new(0),
            connections_closed: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            messages_sent: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            subscriptions: AtomicU64::new(0),
            broadcasts: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            delivery_closed: AtomicU64::new(0),
            delivery_timeouts: AtomicU64::new(0),
            delivery_serialization: AtomicU64::new(0),
            malformed_messages: AtomicU64::new(0),
            unknown_messages: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a connection opened.
    pub fn record_connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a connection closed.
    pub fn record_connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a frame received.
    pub fn record_message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a frame written to a socket.
    pub fn record_message_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a transport error.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a subscription.
    pub fn record_subscription(&self) {
        self.subscriptions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a broadcast call.
    pub fn record_broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a delivery queued for a subscriber.
    pub fn record_delivery(&self) {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed delivery, bucketed by cause.
    pub fn record_delivery_failure(&self, error: &SendError) {
        let counter = match error {
            SendError::Closed => &self.delivery_closed,
            SendError::Timeout(_) => &self.delivery_timeouts,
            SendError::Serialization(_) => &self.delivery_serialization,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an inbound frame dropped as malformed.
    pub fn record_malformed(&self) {
        self.malformed_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an inbound frame dropped for an unknown type.
    pub fn record_unknown(&self) {
        self.unknown_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total connections opened.
    #[must_use]
    pub fn connections_opened(&self) -> u64 {
        self.connections_opened.load(Ordering::Relaxed)
    }

    /// Returns the total connections closed.
    #[must_use]
    pub fn connections_closed(&self) -> u64 {
        self.connections_closed.load(Ordering::Relaxed)
    }

    /// Returns the current active connections.
    #[must_use]
    pub fn active_connections(&self) -> u64 {
        self.connections_opened()
            .saturating_sub(self.connections_closed())
    }

    /// Returns the total frames received.
    #[must_use]
    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    /// Returns the total frames sent.
    #[must_use]
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    /// Returns the total transport errors.
    #[must_use]
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Returns the total subscriptions.
    #[must_use]
    pub fn subscriptions(&self) -> u64 {
        self.subscriptions.load(Ordering::Relaxed)
    }

    /// Returns the total broadcast calls.
    #[must_use]
    pub fn broadcasts(&self) -> u64 {
        self.broadcasts.load(Ordering::Relaxed)
    }

    /// Returns the total successful deliveries.
    #[must_use]
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    /// Returns the total failed deliveries across all causes.
    #[must_use]
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_closed.load(Ordering::Relaxed)
            + self.delivery_timeouts.load(Ordering::Relaxed)
            + self.delivery_serialization.load(Ordering::Relaxed)
    }

    /// Returns the total inbound frames dropped as malformed.
    #[must_use]
    pub fn malformed_messages(&self) -> u64 {
        self.malformed_messages.load(Ordering::Relaxed)
    }

    /// Returns the total inbound frames dropped for an unknown type.
    #[must_use]
    pub fn unknown_messages(&self) -> u64 {
        self.unknown_messages.load(Ordering::Relaxed)
    }

    /// Returns the uptime.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> WsMetricsSnapshot {
        WsMetricsSnapshot {
            connections_opened: self.connections_opened(),
            connections_closed: self.connections_closed(),
            active_connections: self.active_connections(),
            messages_received: self.messages_received(),
            messages_sent: self.messages_sent(),
            errors: self.errors(),
            subscriptions: self.subscriptions(),
            broadcasts: self.broadcasts(),
            deliveries: self.deliveries(),
            delivery_failures: DeliveryFailures {
                closed: self.delivery_closed.load(Ordering::Relaxed),
                timeout: self.delivery_timeouts.load(Ordering::Relaxed),
                serialization: self.delivery_serialization.load(Ordering::Relaxed),
            },
            malformed_messages: self.malformed_messages(),
            unknown_messages: self.unknown_messages(),
            uptime_secs: self.uptime().as_secs(),
        }
    }
}

/// Failed deliveries by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailures {
    /// Peer gone.
    pub closed: u64,
    /// Subscriber too slow.
    pub timeout: u64,
    /// Event could not be encoded.
    pub serialization: u64,
}

/// A point-in-time snapshot of WebSocket metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMetricsSnapshot {
    /// Total connections opened.
    pub connections_opened: u64,
    /// Total connections closed.
    pub connections_closed: u64,
    /// Active connections.
    pub active_connections: u64,
    /// Frames received.
    pub messages_received: u64,
    /// Frames sent.
    pub messages_sent: u64,
    /// Transport errors.
    pub errors: u64,
    /// Subscriptions.
    pub subscriptions: u64,
    /// Broadcast calls.
    pub broadcasts: u64,
    /// Successful deliveries.
    pub deliveries: u64,
    /// Failed deliveries by cause.
    pub delivery_failures: DeliveryFailures,
    /// Malformed inbound frames.
    pub malformed_messages: u64,
    /// Unknown inbound frames.
    pub unknown_messages: u64,
    /// Uptime in seconds.
    pub uptime_secs: u64,
}
