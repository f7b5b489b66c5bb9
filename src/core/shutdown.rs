use tokio::signal;

/// Resolves when SIGINT or SIGTERM arrives, letting axum drain
/// in-flight requests before the process exits.
pub(crate) async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                let _ = signal::ctrl_c().await;
                tracing::info!("shutdown signal received");
                return;
            }
        };

        tokio::select! {
            result = signal::ctrl_c() => {
                if let Err(err) = result {
                    tracing::error!(error = %err, "Failed to listen for Ctrl+C");
                }
            }
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl+C");
    }

    tracing::info!("shutdown signal received");
}
