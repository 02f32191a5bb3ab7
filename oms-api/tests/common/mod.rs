#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use oms_core::{BoxError, EventPublisher, OrderRepository};
use oms_shared::Order;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub const SAMPLE: &str = include_str!("../../../fixtures/order.json");
pub const SAMPLE_UID: &str = "b563feb7b2b84b6test";

pub fn sample_order() -> Order {
    serde_json::from_str(SAMPLE).unwrap()
}

#[derive(Default)]
pub struct MemoryRepository {
    pub orders: Mutex<HashMap<String, Order>>,
    pub fail: AtomicBool,
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

    fn check(&self) -> Result<(), BoxError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("database is unavailable".into());
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryRepository {
    async fn save_order(&self, order: &Order) -> Result<(), BoxError> {
        self.check()?;
        self.orders
            .lock()
            .unwrap()
            .insert(order.order_uid.clone(), order.clone());
        Ok(())
    }

    async fn get_order(&self, order_uid: &str) -> Result<Option<Order>, BoxError> {
        self.check()?;
        Ok(self.orders.lock().unwrap().get(order_uid).cloned())
    }

    async fn all_orders(&self) -> Result<Vec<Order>, BoxError> {
        self.check()?;
        Ok(self.orders.lock().unwrap().values().cloned().collect())
    }
}

/// Records published messages. The first `failures` publishes fail.
#[derive(Default)]
pub struct RecordingPublisher {
    pub sent: Mutex<Vec<(String, Vec<u8>)>>,
    pub failures: AtomicUsize,
}

impl RecordingPublisher {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            ..Self::default()
        }
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, key: &str, payload: &[u8]) -> Result<(), BoxError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err("broker not available".into());
        }
        self.sent
            .lock()
            .unwrap()
            .push((key.to_string(), payload.to_vec()));
        Ok(())
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
