//! Paybutton Host
//!
//! Mounts a payment request controller from a TOML file and drives it from
//! the terminal. Type `click` (or an empty line) to press the button.

mod config;
mod host;
mod shutdown;

use clap::Parser;
use config::ConfigLoader;
use host::{LoggingCallbacks, TerminalHost, spawn_render_logger};
use paybutton_core::PaymentController;
use paybutton_core::collaborators::{Collaborators, ExplorerProcessor, NoProvider};
use shutdown::{shutdown_signal, spawn_config_reload_handler};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Paybutton - payment request controller driven from the terminal
#[derive(Parser, Debug)]
#[command(name = "paybutton-host")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./paybutton.toml", env = "PAYBUTTON_CONFIG")]
    config: PathBuf,

    /// Watch the destination address regardless of the config file
    #[arg(long, default_value = "false")]
    watch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting paybutton-host v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.watch));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let collaborators = Collaborators::from_explorer(
        ExplorerProcessor::new(loaded_config.endpoints),
        Arc::new(NoProvider),
        Arc::new(TerminalHost),
    )
    .with_callbacks(Arc::new(LoggingCallbacks));

    let handle = PaymentController::new(loaded_config.request, collaborators)
        .with_settings(loaded_config.settings)
        .mount();
    let render_logger = spawn_render_logger(handle.subscribe());

    let (reload_tx, mut reload_rx) = mpsc::channel(4);
    let reload_notify = spawn_config_reload_handler(config_loader, reload_tx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                break;
            }
            Some(request) = reload_rx.recv() => {
                handle.reconfigure(request).await?;
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim().is_empty() || line.trim() == "click" => {
                        handle.click().await?;
                    }
                    Some(other) => tracing::warn!(input = %other, "Unknown command, type `click`"),
                    None => break,
                }
            }
        }
    }

    reload_notify.notify_one();

    let report = handle.teardown().await?;
    tracing::info!(cancelled = ?report.cancelled, "Controller unmounted");
    render_logger.await?;

    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,paybutton_core=debug,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
