//! Fan-out of events to document subscribers.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, error, warn};

use super::connection::{ConnectionRegistry, SendError};
use super::messages::Event;
use super::metrics::WsMetrics;
use super::subscriptions::{DocumentId, SubscriptionIndex};

/// Result of one broadcast call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Subscribers in the snapshot that were still registered.
    pub recipients: usize,
    /// Deliveries queued successfully.
    pub delivered: usize,
    /// Deliveries that failed; each failing connection was removed.
    pub failed: usize,
}

/// Delivers events to every current subscriber of a document.
///
/// Delivery is best-effort: one attempt per subscriber, no retry. A failed
/// delivery removes the subscriber's connection.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    subscriptions: Arc<SubscriptionIndex>,
    metrics: Arc<WsMetrics>,
    send_timeout: Duration,
}

impl Broadcaster {
    /// Creates a broadcaster over the given registry and index.
    #[must_use]
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        subscriptions: Arc<SubscriptionIndex>,
        metrics: Arc<WsMetrics>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            subscriptions,
            metrics,
            send_timeout,
        }
    }

    /// Returns the per-subscriber send timeout.
    #[must_use]
    pub const fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Broadcasts `event` to the subscribers of `document`.
    ///
    /// Subscribers are snapshotted at call time and sent to concurrently,
    /// each send bounded by the send timeout. Calls awaited one after another
    /// reach each subscriber in call order.
    pub async fn broadcast<E: Event>(&self, document: &DocumentId, event: &E) -> BroadcastOutcome {
        self.metrics.record_broadcast();

        let subscriber_ids = self.subscriptions.subscribers_of(document).await;
        if subscriber_ids.is_empty() {
            debug!(doc_id = %document, event = event.event_type(), "No subscribers for broadcast");
            return BroadcastOutcome::default();
        }

        let recipients = self.registry.resolve(&subscriber_ids).await;
        let timeout = self.send_timeout;
        let results = join_all(
            recipients
                .iter()
                .map(|connection| async move { (connection.id(), connection.send(event, timeout).await) }),
        )
        .await;

        let mut outcome = BroadcastOutcome {
            recipients: results.len(),
            ..BroadcastOutcome::default()
        };

        for (connection_id, result) in results {
            let error = match result {
                Ok(()) => {
                    outcome.delivered += 1;
                    self.metrics.record_delivery();
                    continue;
                }
                Err(error) => error,
            };

            outcome.failed += 1;
            self.metrics.record_delivery_failure(&error);
            match &error {
                SendError::Closed => {
                    debug!(%connection_id, doc_id = %document, "Subscriber gone, removing");
                }
                SendError::Timeout(after) => {
                    warn!(%connection_id, doc_id = %document, ?after, "Subscriber too slow, removing");
                }
                SendError::Serialization(reason) => {
                    error!(%connection_id, doc_id = %document, %reason, "Failed to encode event, removing subscriber");
                }
            }
            self.registry.remove(connection_id).await;
        }

        debug!(
            doc_id = %document,
            event = event.event_type(),
            recipients = outcome.recipients,
            delivered = outcome.delivered,
            failed = outcome.failed,
            "Broadcast complete"
        );
        outcome
    }
}
