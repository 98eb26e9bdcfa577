//! Serve command - HTTP server plus background generation worker.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use slipee::logging::init_logging;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::common::{build_service, ConfigArgs};
use crate::error::CliError;
use crate::server;

/// Arguments for the serve command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Address to listen on
    #[arg(long, env = "SLIPEE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Requests the generation queue holds
    #[arg(long, env = "SLIPEE_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Pause between two generations in milliseconds
    #[arg(long, env = "SLIPEE_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// Directory for the log file
    #[arg(long, env = "SLIPEE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Run the serve command until Ctrl-C.
pub async fn run(args: ServeArgs) -> Result<(), CliError> {
    let mut config = args.config.load()?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(capacity) = args.queue_capacity {
        config.queue.capacity = capacity;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.queue.delay_ms = delay_ms;
    }
    if let Some(dir) = args.log_dir {
        config.logging.directory = dir;
    }

    let _logging_guard = init_logging(&config.logging.directory, &config.logging.file)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;
    info!("Slipee v{}", slipee::VERSION);

    let (service, worker) = build_service(&config)?;

    let shutdown = CancellationToken::new();
    let worker_handle = tokio::spawn(worker.run(shutdown.clone()));

    let addr = config.server.listen;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|error| CliError::Bind { addr, error })?;
    info!(listen = %addr, "Listening");

    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    let server_shutdown = shutdown.clone();
    let served = axum::serve(listener, server::router(Arc::clone(&service)))
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
        .await;

    // The worker stops on the same token, also when the server failed
    shutdown.cancel();
    if let Err(e) = worker_handle.await {
        warn!(error = %e, "Generation worker ended abnormally");
    }

    info!("{}", service.metrics().snapshot());
    served.map_err(CliError::Serve)
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown requested");
            shutdown.cancel();
        }
        Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C"),
    }
}
