use crate::metrics::Metrics;
use crate::shutdown;
use oms_order::{IngestOutcome, OrderIngestor};
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Consumes the orders topic until shutdown.
///
/// A message's offset is stored only after it has been handled, so anything
/// in flight at shutdown is delivered again on the next start.
pub async fn start_ingest_worker(
    consumer: StreamConsumer,
    ingestor: Arc<OrderIngestor>,
    metrics: Arc<Metrics>,
    stop: watch::Receiver<bool>,
) {
    info!("Ingest worker started, listening for orders...");

    loop {
        let received = tokio::select! {
            _ = shutdown::wait(stop.clone()) => break,
            received = consumer.recv() => received,
        };

        let message = match received {
            Ok(m) => m,
            Err(e) => {
                error!("Kafka error: {}", e);
                continue;
            }
        };

        debug!(
            partition = message.partition(),
            offset = message.offset(),
            "Got message from {}",
            message.topic()
        );
        let payload = message.payload().unwrap_or_default();

        let Some(outcome) = ingest_with_retry(&ingestor, &metrics, payload, &stop).await else {
            break;
        };
        debug!(outcome = outcome.kind(), "Message handled");

        if let Err(e) = consumer.store_offset_from_message(&message) {
            error!("Failed to store offset {}: {}", message.offset(), e);
        }
    }

    info!("Ingest worker stopping, committing stored offsets");
    if let Err(e) = consumer.commit_consumer_state(CommitMode::Sync) {
        // NoOffset just means nothing was consumed since the last commit
        warn!("Final offset commit failed: {}", e);
    }
}

/// Handles one payload, retrying with backoff while the outcome must not be
/// committed. Returns `None` when shutdown interrupts the retries.
pub async fn ingest_with_retry(
    ingestor: &OrderIngestor,
    metrics: &Metrics,
    payload: &[u8],
    stop: &watch::Receiver<bool>,
) -> Option<IngestOutcome> {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        let outcome = ingestor.handle(payload).await;
        metrics.record_ingest(outcome.kind());
        if outcome.should_commit() {
            return Some(outcome);
        }

        warn!(?outcome, "Message could not be handled, retrying in {:?}", backoff);
        tokio::select! {
            _ = shutdown::wait(stop.clone()) => return None,
            _ = sleep(backoff) => {}
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}
