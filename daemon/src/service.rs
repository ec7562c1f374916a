//! `run` mode: sweep proposals on an interval until shutdown.

use crate::commands::{self, Engine};
use crate::config::DaemonConfig;
use stakegov_types::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for SIGINT");
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
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
        _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
    }
}

/// Sweep every `config.sweep_interval_secs`, persisting after each sweep that
/// changed something and once more on shutdown.
pub async fn run(engine: Engine, config: DaemonConfig) -> anyhow::Result<()> {
    let engine = Arc::new(engine);
    let interval_secs = config.sweep_interval_secs.max(1);
    tracing::info!(
        every = %stakegov_utils::format_duration(interval_secs),
        auto_activate = config.auto_activate,
        state = %config.state_path().display(),
        "sweep service started"
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                // Activation may sleep between adapter retries; keep it off
                // the async workers.
                let sweeper = Arc::clone(&engine);
                let auto_activate = config.auto_activate;
                let report = tokio::task::spawn_blocking(move || {
                    sweeper.sweep(Timestamp::now(), auto_activate)
                })
                .await?;
                match report {
                    Ok(report) if report.is_empty() => {}
                    Ok(report) => {
                        tracing::info!(
                            activated = report.activated.len(),
                            closed = report.closed.len(),
                            failed_empty = report.failed_empty.len(),
                            errors = report.errors.len(),
                            "sweep applied changes"
                        );
                        commands::persist(&engine, &config)?;
                    }
                    Err(e) => tracing::error!(error = %e, "sweep aborted"),
                }
            }
        }
    }

    commands::persist(&engine, &config)?;
    tracing::info!("stakegov exited cleanly");
    Ok(())
}
