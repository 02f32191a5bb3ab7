use anyhow::Context;
use oms_api::metrics::Metrics;
use oms_api::{app, shutdown, telemetry, worker, AppState};
use oms_order::{OrderCache, OrderIngestor, OrderService};
use oms_store::{order_consumer, Config, DbClient, PgOrderRepository, TopicProducer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    telemetry::init_tracing(&config.env, "oms_api");
    tracing::debug!("debug logging enabled");

    if let Err(e) = run(config).await {
        tracing::error!("oms-api failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;
    tracing::info!("Starting OMS API on {}", config.server.address);

    // Postgres
    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;
    let repo = Arc::new(PgOrderRepository::new(db.pool.clone()));

    // Cache
    let cache = Arc::new(OrderCache::new(
        Duration::from_secs(config.cache.ttl_secs),
        config.cache.limit,
    ));
    let orders = Arc::new(OrderService::new(repo.clone(), cache.clone()));
    orders.warm_cache().await.context("Failed to load orders into the cache")?;
    let sweeper = cache.spawn_sweeper(Duration::from_secs(config.cache.sweep_interval_secs));

    // Kafka
    let dead_letters = TopicProducer::new(&config.kafka.brokers, &config.kafka.writer)
        .context("Failed to create dead-letter producer")?;
    let consumer = order_consumer(&config.kafka.brokers, &config.kafka.reader)
        .context("Failed to create orders consumer")?;

    let metrics = Arc::new(Metrics::new().context("Failed to register metrics")?);
    let ingestor = Arc::new(OrderIngestor::new(repo, cache, Arc::new(dead_letters)));

    let (stop_tx, stop_rx) = watch::channel(false);
    let worker = tokio::spawn(worker::start_ingest_worker(
        consumer,
        ingestor,
        metrics.clone(),
        stop_rx.clone(),
    ));
    tokio::spawn(shutdown::broadcast_on_signal(stop_tx));

    let state = AppState {
        orders,
        metrics,
        request_timeout: Duration::from_secs(config.server.timeout_secs),
    };

    let listener = tokio::net::TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.address))?;
    tracing::info!("Listening on {}", config.server.address);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown::wait(stop_rx))
        .await
        .context("HTTP server failed")?;

    tracing::info!("Shutting down");
    if let Err(e) = worker.await {
        tracing::error!("Ingest worker panicked: {}", e);
    }
    sweeper.abort();
    db.pool.close().await;
    Ok(())
}
