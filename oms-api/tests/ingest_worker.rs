mod common;

use common::{MemoryRepository, RecordingPublisher, SAMPLE, SAMPLE_UID};
use oms_api::metrics::Metrics;
use oms_api::worker::ingest_with_retry;
use oms_order::{IngestOutcome, OrderCache, OrderIngestor};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

fn ingestor(repo: Arc<MemoryRepository>, dlq: Arc<RecordingPublisher>) -> OrderIngestor {
    let cache = Arc::new(OrderCache::new(Duration::from_secs(60), 10));
    OrderIngestor::new(repo, cache, dlq)
}

#[tokio::test(start_paused = true)]
async fn test_saved_on_first_attempt() {
    let repo = Arc::new(MemoryRepository::default());
    let ingestor = ingestor(repo.clone(), Arc::new(RecordingPublisher::default()));
    let metrics = Metrics::new().unwrap();
    let (_tx, rx) = watch::channel(false);

    let outcome = ingest_with_retry(&ingestor, &metrics, SAMPLE.as_bytes(), &rx).await;

    assert_eq!(
        outcome,
        Some(IngestOutcome::Saved {
            order_uid: SAMPLE_UID.to_string()
        })
    );
    assert!(repo.orders.lock().unwrap().contains_key(SAMPLE_UID));
}

#[tokio::test(start_paused = true)]
async fn test_failed_message_is_retried_until_dead_lettered() {
    let repo = Arc::new(MemoryRepository::default());
    repo.fail.store(true, Ordering::SeqCst);
    let dlq = Arc::new(RecordingPublisher::failing(2));
    let ingestor = ingestor(repo, dlq.clone());
    let metrics = Metrics::new().unwrap();
    let (_tx, rx) = watch::channel(false);

    let outcome = ingest_with_retry(&ingestor, &metrics, SAMPLE.as_bytes(), &rx)
        .await
        .unwrap();

    assert_eq!(outcome.kind(), "dead_lettered");
    assert_eq!(dlq.sent.lock().unwrap().len(), 1);
    let text = metrics.render().unwrap();
    assert!(text.contains(r#"oms_ingested_messages_total{outcome="failed"} 2"#));
    assert!(text.contains(r#"oms_ingested_messages_total{outcome="dead_lettered"} 1"#));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_retries() {
    let repo = Arc::new(MemoryRepository::default());
    repo.fail.store(true, Ordering::SeqCst);
    let ingestor = ingestor(repo, Arc::new(RecordingPublisher::failing(usize::MAX)));
    let metrics = Metrics::new().unwrap();
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        let _ = tx.send(true);
    });

    let outcome = ingest_with_retry(&ingestor, &metrics, SAMPLE.as_bytes(), &rx).await;

    assert!(outcome.is_none());
}
