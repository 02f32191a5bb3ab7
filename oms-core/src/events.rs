use async_trait::async_trait;

use crate::BoxError;

/// Publishes keyed payloads to one destination topic.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, key: &str, payload: &[u8]) -> Result<(), BoxError>;
}
