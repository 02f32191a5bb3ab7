use crate::error::AppError;
use axum::{body::Bytes, extract::State, routing::post, Router};
use oms_core::EventPublisher;
use oms_shared::Order;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct SenderState {
    pub publisher: Arc<dyn EventPublisher>,
}

/// Router of the `oms-sender` helper: accepts orders over HTTP and puts them on the orders topic
pub fn sender_app(state: SenderState, request_timeout: Duration) -> Router {
    let router = Router::new()
        .route("/save", post(save_order).get(save_usage))
        .with_state(state);

    crate::with_middleware(router, request_timeout)
}

pub async fn save_order(State(state): State<SenderState>, body: Bytes) -> Result<&'static str, AppError> {
    let order: Order = serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let payload = serde_json::to_vec(&order)?;

    state
        .publisher
        .publish(&order.order_uid, &payload)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    info!(order_uid = %order.order_uid, "Order sent");
    Ok("sent order")
}

async fn save_usage() -> AppError {
    AppError::MethodNotAllowed("use POST to send an order with JSON".to_string())
}
