//! Render command - generate one map now and print where it was cached.

use clap::Args;
use slipee::logging::init_console_logging;
use tracing::info;

use super::common::{build_service, ConfigArgs, RequestArgs};
use crate::error::CliError;

/// Arguments for the render command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub request: RequestArgs,
}

/// Run the render command.
///
/// Bypasses the queue. A cached map is printed without fetching.
pub async fn run(args: RenderArgs) -> Result<(), CliError> {
    init_console_logging();

    let config = args.config.load()?;
    let (service, _worker) = build_service(&config)?;
    let request = args.request.to_request();

    info!(request = %request, "Rendering");
    let path = service
        .generate_detached(request)
        .await
        .map_err(CliError::Render)?;

    println!("{}", path.display());
    Ok(())
}
