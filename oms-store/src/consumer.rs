use crate::app_config::ReaderConfig;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaResult;
use tracing::{info, warn};

impl ReaderConfig {
    /// Maps `start_offset` to librdkafka's `auto.offset.reset`.
    pub fn offset_reset(&self) -> &'static str {
        match self.start_offset.to_ascii_lowercase().as_str() {
            "earliest" | "first" => "earliest",
            "latest" | "last" => "latest",
            other => {
                warn!("Unknown start offset '{}', reading from latest", other);
                "latest"
            }
        }
    }
}

/// Consumer group member subscribed to the orders topic.
///
/// Offsets are stored by the caller once a message is handled and
/// committed in the background every `commit_interval_ms`.
pub fn order_consumer(brokers: &str, cfg: &ReaderConfig) -> KafkaResult<StreamConsumer> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("group.id", &cfg.group_id)
        .set("bootstrap.servers", brokers)
        .set("enable.auto.commit", "true")
        .set("auto.commit.interval.ms", cfg.commit_interval_ms.to_string())
        .set("enable.auto.offset.store", "false")
        .set("auto.offset.reset", cfg.offset_reset())
        .set("fetch.min.bytes", cfg.min_bytes.to_string())
        .set("fetch.max.bytes", cfg.max_bytes.to_string())
        .create()?;

    consumer.subscribe(&[cfg.topic.as_str()])?;
    info!("Subscribed to topic {} as group {}", cfg.topic, cfg.group_id);
    Ok(consumer)
}
