pub mod order;
pub mod timefmt;
