use oms_shared::Order;

use crate::{CoreError, CoreResult};

/// Check an incoming order before it is stored.
///
/// Every violation is collected so a rejected message can be diagnosed from one log line.
pub fn validate_order(order: &Order) -> CoreResult<()> {
    let mut problems: Vec<String> = Vec::new();

    let required: [(&str, &str); 10] = [
        ("order_uid", order.order_uid.as_str()),
        ("track_number", order.track_number.as_str()),
        ("entry", order.entry.as_str()),
        ("customer_id", order.customer_id.as_str()),
        ("delivery_service", order.delivery_service.as_str()),
        ("delivery.name", order.delivery.name.as_str()),
        ("delivery.phone", order.delivery.phone.expose().as_str()),
        ("delivery.address", order.delivery.address.as_str()),
        ("delivery.city", order.delivery.city.as_str()),
        ("payment.transaction", order.payment.transaction.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            problems.push(format!("{} is required", field));
        }
    }

    if !order.delivery.email.contains('@') {
        problems.push("delivery.email is not an email address".to_string());
    }

    let currency = &order.payment.currency;
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        problems.push(format!("payment.currency {:?} is not an ISO 4217 code", currency));
    }

    let amounts = [
        ("payment.amount", order.payment.amount),
        ("payment.delivery_cost", order.payment.delivery_cost),
        ("payment.goods_total", order.payment.goods_total),
        ("payment.custom_fee", order.payment.custom_fee),
    ];
    for (field, value) in amounts {
        if value < 0 {
            problems.push(format!("{} must not be negative", field));
        }
    }

    if order.items.is_empty() {
        problems.push("order has no items".to_string());
    }

    for (index, item) in order.items.iter().enumerate() {
        if item.price < 0 {
            problems.push(format!("items[{}].price must not be negative", index));
        }
        if item.total_price < 0 {
            problems.push(format!("items[{}].total_price must not be negative", index));
        }
        if !(0..=100).contains(&item.sale) {
            problems.push(format!("items[{}].sale must be within 0..=100", index));
        }
        if item.track_number != order.track_number {
            problems.push(format!(
                "items[{}].track_number {} does not match order track_number {}",
                index, item.track_number, order.track_number
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(problems.join("; ")))
    }
}
