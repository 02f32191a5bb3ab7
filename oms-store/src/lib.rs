pub mod app_config;
pub mod consumer;
pub mod database;
pub mod events;
pub mod order_repo;

pub use app_config::{Config, SenderConfig};
pub use consumer::order_consumer;
pub use database::DbClient;
pub use events::TopicProducer;
pub use order_repo::PgOrderRepository;
