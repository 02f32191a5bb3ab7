use async_trait::async_trait;
use oms_core::{BoxError, EventPublisher, OrderRepository};
use oms_shared::Order;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub const SAMPLE: &str = include_str!("../../fixtures/order.json");

pub fn sample_order() -> Order {
    serde_json::from_str(SAMPLE).unwrap()
}

pub fn order_with_uid(order_uid: &str) -> Order {
    let mut order = sample_order();
    order.order_uid = order_uid.to_string();
    order
}

#[derive(Default)]
pub struct MemoryRepository {
    pub orders: Mutex<HashMap<String, Order>>,
    pub fail: AtomicBool,
    pub reads: AtomicUsize,
}

impl MemoryRepository {
    pub fn with_orders(orders: Vec<Order>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.orders.lock().unwrap();
            for order in orders {
                map.insert(order.order_uid.clone(), order);
            }
        }
        repo
    }
}

#[async_trait]
impl OrderRepository for MemoryRepository {
    async fn save_order(&self, order: &Order) -> Result<(), BoxError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("connection refused".into());
        }
        self.orders
            .lock()
            .unwrap()
            .entry(order.order_uid.clone())
            .or_insert_with(|| order.clone());
        Ok(())
    }

    async fn get_order(&self, order_uid: &str) -> Result<Option<Order>, BoxError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err("connection refused".into());
        }
        Ok(self.orders.lock().unwrap().get(order_uid).cloned())
    }

    async fn all_orders(&self) -> Result<Vec<Order>, BoxError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("connection refused".into());
        }
        Ok(self.orders.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub sent: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, key: &str, payload: &[u8]) -> Result<(), BoxError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("broker unavailable".into());
        }
        self.sent.lock().unwrap().push((key.to_string(), payload.to_vec()));
        Ok(())
    }
}
