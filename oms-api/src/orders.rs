use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use oms_shared::Order;
use tracing::debug;

pub fn routes() -> Router<AppState> {
    Router::new().route("/order/{order_uid}", get(get_order))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_uid): Path<String>,
) -> Result<Json<Order>, AppError> {
    match state.orders.get_order(&order_uid).await? {
        Some(lookup) => {
            debug!(order_uid = %order_uid, source = lookup.source.as_str(), "Order found");
            state.metrics.record_lookup(lookup.source.as_str());
            Ok(Json(lookup.order))
        }
        None => {
            state.metrics.record_lookup("miss");
            Err(AppError::NotFound(format!("order {} not found", order_uid)))
        }
    }
}
