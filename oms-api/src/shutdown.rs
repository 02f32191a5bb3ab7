use tokio::signal;
use tokio::sync::watch;
use tracing::info;

/// Resolves on Ctrl+C or SIGTERM
pub async fn signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Waits for a shutdown signal, then notifies every receiver of `tx`.
pub async fn broadcast_on_signal(tx: watch::Sender<bool>) {
    signal().await;
    let _ = tx.send(true);
}

/// Resolves once `rx` has seen `true` or its sender is gone
pub async fn wait(mut rx: watch::Receiver<bool>) {
    // Err means the sender was dropped, which also ends the service
    let _ = rx.wait_for(|stop| *stop).await;
}
