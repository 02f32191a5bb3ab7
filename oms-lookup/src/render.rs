use crate::format::{format_currency, format_date};
use oms_shared::{Item, Order};
use std::fmt;

const LABEL_WIDTH: usize = 18;

struct Panel<'a> {
    title: String,
    rows: Vec<(&'a str, String)>,
}

impl Panel<'_> {
    fn write_rows(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in &self.rows {
            writeln!(f, "{:<width$}{}", format!("{}:", label), value, width = LABEL_WIDTH)?;
        }
        Ok(())
    }
}

impl fmt::Display for Panel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // Nested panels (one per item) get a bare heading
            writeln!(f, "{}", self.title)?;
        } else {
            writeln!(f, "== {} ==", self.title)?;
        }
        self.write_rows(f)
    }
}

fn summary(order: &Order) -> Panel<'static> {
    Panel {
        title: "Order Summary".to_string(),
        rows: vec![
            ("Order UID", order.order_uid.clone()),
            ("Track Number", order.track_number.clone()),
            ("Customer ID", order.customer_id.clone()),
            ("Date Created", format_date(&order.date_created)),
            ("Delivery Service", order.delivery_service.clone()),
            ("Entry", order.entry.clone()),
        ],
    }
}

fn delivery(order: &Order) -> Panel<'static> {
    let d = &order.delivery;
    Panel {
        title: "Delivery Information".to_string(),
        rows: vec![
            ("Name", d.name.clone()),
            ("Phone", d.phone.expose().clone()),
            ("Email", d.email.expose().clone()),
            ("Address", d.address.clone()),
            ("City", d.city.clone()),
            ("Region", d.region.clone()),
            ("ZIP", d.zip.clone()),
        ],
    }
}

fn payment(order: &Order) -> Panel<'static> {
    let p = &order.payment;
    let money = |amount| format_currency(amount, &p.currency);
    Panel {
        title: "Payment Information".to_string(),
        rows: vec![
            ("Transaction ID", p.transaction.clone()),
            ("Provider", p.provider.clone()),
            ("Bank", p.bank.clone()),
            ("Total Amount", money(p.amount)),
            ("Goods Total", money(p.goods_total)),
            ("Delivery Cost", money(p.delivery_cost)),
            ("Custom Fee", money(p.custom_fee)),
        ],
    }
}

fn item(item: &Item, currency: &str) -> Panel<'static> {
    let mut price = format_currency(item.price, currency);
    if item.sale > 0 {
        price.push_str(&format!(" [-{}%]", item.sale));
    }
    let size = if item.size.is_empty() {
        "N/A".to_string()
    } else {
        item.size.clone()
    };
    let status = if item.status == 202 {
        format!("{} (success)", item.status)
    } else {
        item.status.to_string()
    };

    Panel {
        title: format!("{} ({})", item.name, item.brand),
        rows: vec![
            ("Price", price),
            ("Total Price", format_currency(item.total_price, currency)),
            ("Size", size),
            ("Status", status),
            ("SKU", item.nm_id.to_string()),
        ],
    }
}

/// Plain-text rendering of an order in four panels
pub fn render_order(order: &Order) -> String {
    let mut out = String::new();
    for panel in [summary(order), delivery(order), payment(order)] {
        out.push_str(&panel.to_string());
        out.push('\n');
    }

    out.push_str(&format!("== Order Items ({}) ==\n", order.items.len()));
    for (index, it) in order.items.iter().enumerate() {
        if index > 0 {
            out.push_str("--\n");
        }
        out.push_str(&format!("{:#}", item(it, &order.payment.currency)));
    }
    out
}
