use anyhow::Context;
use oms_api::sender::{sender_app, SenderState};
use oms_api::{shutdown, telemetry};
use oms_store::{SenderConfig, TopicProducer};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = match SenderConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    telemetry::init_tracing(&config.env, "oms_sender");

    if let Err(e) = run(config).await {
        tracing::error!("oms-sender failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: SenderConfig) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;
    let producer = TopicProducer::new(&config.kafka.brokers, &config.kafka.writer)
        .context("Failed to create orders producer")?;
    tracing::info!("Publishing orders to topic {}", producer.topic());

    let state = SenderState {
        publisher: Arc::new(producer),
    };
    let app = sender_app(state, Duration::from_secs(config.server.timeout_secs));

    let listener = tokio::net::TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.address))?;
    tracing::info!("Sender listening on {}", config.server.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Sender stopped");
    Ok(())
}
