//! Shutdown signal handling.

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancel `token` on SIGTERM or SIGINT (Ctrl+C elsewhere).
pub async fn cancel_on_signal(token: CancellationToken) {
    if let Err(e) = wait_for_signal().await {
        error!("Failed to install signal handler: {e}");
        return;
    }
    token.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("Received SIGINT, shutting down"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down");
    Ok(())
}
