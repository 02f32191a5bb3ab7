use crate::cache::OrderCache;
use oms_core::{validate_order, EventPublisher, OrderRepository};
use oms_shared::Order;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Result of processing one message from the orders topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Stored and cached
    Saved { order_uid: String },
    /// Undecodable or invalid; sent to the dead-letter topic
    Rejected { reason: String },
    /// Valid but could not be stored; sent to the dead-letter topic
    DeadLettered { reason: String },
    /// Could not be stored nor dead-lettered
    Failed { reason: String },
}

impl IngestOutcome {
    /// Whether the message offset may be committed. A failed message must be seen again.
    pub fn should_commit(&self) -> bool {
        !matches!(self, IngestOutcome::Failed { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            IngestOutcome::Saved { .. } => "saved",
            IngestOutcome::Rejected { .. } => "rejected",
            IngestOutcome::DeadLettered { .. } => "dead_lettered",
            IngestOutcome::Failed { .. } => "failed",
        }
    }
}

/// Decodes, validates and stores orders arriving as raw message payloads
pub struct OrderIngestor {
    repo: Arc<dyn OrderRepository>,
    cache: Arc<OrderCache>,
    dead_letters: Arc<dyn EventPublisher>,
}

impl OrderIngestor {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        cache: Arc<OrderCache>,
        dead_letters: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repo,
            cache,
            dead_letters,
        }
    }

    pub async fn handle(&self, payload: &[u8]) -> IngestOutcome {
        let order: Order = match serde_json::from_slice(payload) {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "Undecodable order message");
                return self.reject("", payload, format!("decode: {}", e)).await;
            }
        };
        debug!(order_uid = %order.order_uid, "Got order message");

        if let Err(e) = validate_order(&order) {
            error!(order_uid = %order.order_uid, error = %e, "Order failed validation");
            return self.reject(&order.order_uid, payload, e.to_string()).await;
        }

        if let Err(e) = self.repo.save_order(&order).await {
            error!(order_uid = %order.order_uid, error = %e, "Failed to save order");
            let reason = format!("save: {}", e);
            return match self.dead_letters.publish(&order.order_uid, payload).await {
                Ok(()) => IngestOutcome::DeadLettered { reason },
                Err(dlq_err) => {
                    error!(order_uid = %order.order_uid, error = %dlq_err, "Failed to send order to dead-letter topic");
                    IngestOutcome::Failed {
                        reason: format!("{}; dead-letter: {}", reason, dlq_err),
                    }
                }
            };
        }

        let order_uid = order.order_uid.clone();
        self.cache.put(order).await;
        debug!(order_uid = %order_uid, "Saved order");
        IngestOutcome::Saved { order_uid }
    }

    async fn reject(&self, key: &str, payload: &[u8], reason: String) -> IngestOutcome {
        match self.dead_letters.publish(key, payload).await {
            Ok(()) => IngestOutcome::Rejected { reason },
            Err(e) => {
                error!(error = %e, "Failed to send rejected message to dead-letter topic");
                IngestOutcome::Failed {
                    reason: format!("{}; dead-letter: {}", reason, e),
                }
            }
        }
    }
}
