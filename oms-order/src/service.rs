use crate::cache::OrderCache;
use oms_core::{CoreResult, OrderRepository};
use oms_shared::Order;
use std::sync::Arc;
use tracing::{debug, info};

/// Where a looked-up order was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Cache,
    Store,
}

impl LookupSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupSource::Cache => "cache",
            LookupSource::Store => "store",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lookup {
    pub order: Order,
    pub source: LookupSource,
}

/// Read path for orders: the cache answers first, the repository fills misses.
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    cache: Arc<OrderCache>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>, cache: Arc<OrderCache>) -> Self {
        Self { repo, cache }
    }

    pub fn cache(&self) -> &Arc<OrderCache> {
        &self.cache
    }

    pub async fn get_order(&self, order_uid: &str) -> CoreResult<Option<Lookup>> {
        if let Some(order) = self.cache.get(order_uid).await {
            debug!(order_uid, "Order served from cache");
            return Ok(Some(Lookup {
                order,
                source: LookupSource::Cache,
            }));
        }

        let Some(order) = self.repo.get_order(order_uid).await? else {
            return Ok(None);
        };

        self.cache.put(order.clone()).await;
        Ok(Some(Lookup {
            order,
            source: LookupSource::Store,
        }))
    }

    /// Load stored orders into the cache. Returns how many orders were read.
    pub async fn warm_cache(&self) -> CoreResult<usize> {
        let orders = self.repo.all_orders().await?;
        let count = orders.len();
        self.cache.load(orders).await;
        info!("Warmed order cache with {} stored orders ({} kept)", count, self.cache.len().await);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{order_with_uid, MemoryRepository};
    use oms_core::CoreError;
    use std::sync::atomic::Ordering;
    use tokio::time::Duration;

    fn service(repo: Arc<MemoryRepository>, limit: usize) -> OrderService {
        let cache = Arc::new(OrderCache::new(Duration::from_secs(60), limit));
        OrderService::new(repo, cache)
    }

    #[tokio::test]
    async fn test_miss_reads_store_then_cache() {
        let repo = Arc::new(MemoryRepository::with_orders(vec![order_with_uid("a")]));
        let service = service(repo.clone(), 10);

        let first = service.get_order("a").await.unwrap().unwrap();
        assert_eq!(first.source, LookupSource::Store);

        let second = service.get_order("a").await.unwrap().unwrap();
        assert_eq!(second.source, LookupSource::Cache);
        assert_eq!(second.order, first.order);

        assert_eq!(repo.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let repo = Arc::new(MemoryRepository::default());
        let service = service(repo, 10);

        assert!(service.get_order("missing").await.unwrap().is_none());
        assert!(service.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal_error() {
        let repo = Arc::new(MemoryRepository::default());
        repo.fail.store(true, Ordering::SeqCst);
        let service = service(repo, 10);

        let err = service.get_order("a").await.unwrap_err();
        assert!(matches!(err, CoreError::Internal(ref m) if m.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_warm_cache_respects_limit() {
        let orders = vec![order_with_uid("a"), order_with_uid("b"), order_with_uid("c")];
        let repo = Arc::new(MemoryRepository::with_orders(orders));
        let service = service(repo.clone(), 2);

        assert_eq!(service.warm_cache().await.unwrap(), 3);
        assert_eq!(service.cache().len().await, 2);
    }
}
