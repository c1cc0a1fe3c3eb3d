use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};

use super::engine::{effective_interval, IntervalTicker, UpdateEngine};
use crate::config::Settings;

pub async fn run(settings: Settings) -> Result<()> {
    let interval = effective_interval(settings.interval_seconds);

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn shutdown signal handler
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown().await {
            error!("Error waiting for shutdown signal: {}", e);
        }
        let _ = shutdown_tx.send(true);
    });

    let engine = UpdateEngine::from_settings(&settings)?;

    info!(
        "Daemon started. Updating {} every {} seconds",
        settings.hostname(),
        interval.as_secs()
    );

    tokio::spawn(engine.run(IntervalTicker::new(interval), shutdown_rx)).await?;

    info!("Daemon stopped");
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
