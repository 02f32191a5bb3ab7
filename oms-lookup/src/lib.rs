//! Order lookup: fetches a single order from the order service and renders it.

pub mod client;
pub mod format;
pub mod render;
pub mod session;

pub use client::{LookupClient, LookupError};
pub use format::{format_currency, format_date};
pub use render::render_order;
pub use session::{LookupView, OrderLookup, Submission};
