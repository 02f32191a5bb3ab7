use async_trait::async_trait;
use oms_shared::Order;

use crate::BoxError;

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist the full order aggregate. Saving an order that already exists is a no-op.
    async fn save_order(&self, order: &Order) -> Result<(), BoxError>;

    async fn get_order(&self, order_uid: &str) -> Result<Option<Order>, BoxError>;

    /// Every stored order, used to warm the cache at startup
    async fn all_orders(&self) -> Result<Vec<Order>, BoxError>;
}
