//! Fingerprint command - show a map's cache key and path.

use clap::Args;
use slipee::cache::{fingerprint, ImageCache};

use super::common::{ConfigArgs, RequestArgs};
use crate::error::CliError;

/// Arguments for the fingerprint command.
#[derive(Debug, Args)]
pub struct FingerprintArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub request: RequestArgs,
}

/// Run the fingerprint command. Nothing is fetched or written.
pub async fn run(args: FingerprintArgs) -> Result<(), CliError> {
    let config = args.config.load()?;
    let request = args.request.to_request();
    request
        .validate(&config.request_limits())
        .map_err(CliError::InvalidRequest)?;

    let cache = ImageCache::new(config.cache.directory.clone());
    let path = cache.path_for(&request);

    let cached = cache.exists(&request).await;

    println!("fingerprint: {}", fingerprint(&request));
    println!("path:        {}", path.display());
    println!("cached:      {}", if cached { "yes" } else { "no" });
    Ok(())
}
