use oms_shared::Order;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry {
    order: Order,
    stored_at: Instant,
    tick: u64,
}

/// Entries plus a recency index: the smallest tick is the least recently used uid.
#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    recency: BTreeMap<u64, String>,
    next_tick: u64,
}

impl CacheState {
    fn bump(&mut self) -> u64 {
        self.next_tick += 1;
        self.next_tick
    }

    fn touch(&mut self, order_uid: &str) {
        let tick = self.bump();
        if let Some(entry) = self.entries.get_mut(order_uid) {
            self.recency.remove(&entry.tick);
            entry.tick = tick;
            self.recency.insert(tick, order_uid.to_string());
        }
    }

    fn remove(&mut self, order_uid: &str) -> bool {
        match self.entries.remove(order_uid) {
            Some(entry) => {
                self.recency.remove(&entry.tick);
                true
            }
            None => false,
        }
    }

    fn evict_lru(&mut self) -> Option<String> {
        let (_, order_uid) = self.recency.pop_first()?;
        self.entries.remove(&order_uid);
        Some(order_uid)
    }
}

/// Bounded in-memory order cache with LRU eviction and a per-entry time to live
pub struct OrderCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    limit: usize,
}

impl OrderCache {
    pub fn new(ttl: Duration, limit: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl,
            limit,
        }
    }

    /// Insert or replace an order. It becomes the most recently used entry and its age resets.
    pub async fn put(&self, order: Order) {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        let tick = state.bump();
        let order_uid = order.order_uid.clone();

        let previous = state.entries.insert(
            order_uid.clone(),
            CacheEntry {
                order,
                stored_at: now,
                tick,
            },
        );
        if let Some(previous) = previous {
            state.recency.remove(&previous.tick);
        }
        state.recency.insert(tick, order_uid);

        while state.entries.len() > self.limit {
            match state.evict_lru() {
                Some(evicted) => debug!(order_uid = %evicted, "Evicted least recently used order"),
                None => break,
            }
        }
    }

    /// Look up an order. Expired entries are dropped and reported as a miss.
    pub async fn get(&self, order_uid: &str) -> Option<Order> {
        let mut state = self.state.lock().await;

        let expired = state.entries.get(order_uid)?.stored_at.elapsed() > self.ttl;
        if expired {
            state.remove(order_uid);
            debug!(order_uid, "Cached order expired");
            return None;
        }

        state.touch(order_uid);
        state.entries.get(order_uid).map(|entry| entry.order.clone())
    }

    pub async fn load(&self, orders: Vec<Order>) {
        for order in orders {
            self.put(order).await;
        }
    }

    /// Remove every expired entry, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut state = self.state.lock().await;
        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.stored_at.elapsed() > self.ttl)
            .map(|(order_uid, _)| order_uid.clone())
            .collect();

        for order_uid in &expired {
            state.remove(order_uid);
        }
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Run `purge_expired` every `period` until the returned task is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Swept expired orders from cache");
                }
            }
        })
    }
}
