use crate::metrics::Metrics;
use oms_order::OrderService;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
    pub metrics: Arc<Metrics>,
    pub request_timeout: Duration,
}
