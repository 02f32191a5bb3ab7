use crate::app_config::WriterConfig;
use async_trait::async_trait;
use oms_core::{BoxError, EventPublisher};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{debug, error};

/// Kafka producer bound to a single topic
#[derive(Clone)]
pub struct TopicProducer {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl TopicProducer {
    pub fn new(brokers: &str, cfg: &WriterConfig) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", &cfg.client_id)
            .set("message.send.max.retries", cfg.retries.to_string())
            .set("message.max.bytes", cfg.max_message_bytes.to_string())
            .set("acks", &cfg.acks)
            .set("compression.type", &cfg.compression)
            .set("message.timeout.ms", cfg.timeout_ms.to_string())
            .create()?;

        Ok(Self {
            producer,
            topic: cfg.topic.clone(),
            timeout: Duration::from_millis(cfg.timeout_ms),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn send(&self, key: &str, payload: &[u8]) -> Result<(), rdkafka::error::KafkaError> {
        let mut record = FutureRecord::<str, [u8]>::to(&self.topic).payload(payload);
        if !key.is_empty() {
            record = record.key(key);
        }

        match self.producer.send(record, Timeout::After(self.timeout)).await {
            Ok((partition, offset)) => {
                debug!("Sent message to {}/{}: partition {} offset {}", self.topic, key, partition, offset);
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to send message to {}: {}", self.topic, e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl EventPublisher for TopicProducer {
    async fn publish(&self, key: &str, payload: &[u8]) -> Result<(), BoxError> {
        self.send(key, payload).await.map_err(|e| Box::new(e) as BoxError)
    }
}
