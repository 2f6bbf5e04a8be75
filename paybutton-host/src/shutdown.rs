//! Signal handling for graceful shutdown and config reload.

use crate::config::ConfigLoader;
use paybutton_core::config::PaymentRequestConfig;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{Notify, mpsc};

/// Completes when SIGTERM or SIGINT (Ctrl+C) is received.
///
/// Returns an error when the handlers cannot be installed.
pub async fn shutdown_signal() -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, unmounting");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, unmounting");
        }
    }
    Ok(())
}

/// Spawns a task that re-reads the config file on SIGHUP and forwards the
/// new payment request.
///
/// Returns a Notify that stops the task.
pub fn spawn_config_reload_handler(
    config_loader: Arc<ConfigLoader>,
    reload_tx: mpsc::Sender<PaymentRequestConfig>,
) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(sighup) => sighup,
            Err(e) => {
                tracing::error!("Failed to install SIGHUP handler: {}", e);
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.load() {
                        Ok(loaded_config) => {
                            if reload_tx.send(loaded_config.request).await.is_err() {
                                break;
                            }
                            tracing::info!("Configuration reloaded successfully");
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload configuration: {}", e);
                        }
                    }
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }
            }
        }
    });

    shutdown_notify
}
