pub mod models;
pub mod pii;

pub use models::order::{Delivery, Item, Order, Payment};
pub use pii::Masked;
