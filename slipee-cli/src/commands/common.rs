//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use slipee::config::ConfigFile;
use slipee::overlay::{MarkerOverlay, OverlayFactory};
use slipee::provider::{
    resolve_template, AsyncReqwestClient, TilePreset, XyzTileSource, DEFAULT_USER_AGENT,
};
use slipee::request::MapRequest;
use slipee::service::{GenerationWorker, StaticMapService};
use tracing::info;

use crate::error::CliError;

/// The tile source every command uses.
pub type HttpTileSource = XyzTileSource<AsyncReqwestClient>;

/// Service over the HTTP tile source.
pub type MapService = StaticMapService<HttpTileSource>;

/// Settings that every command can override.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config file (defaults to ~/.slipee/config.ini)
    #[arg(long, env = "SLIPEE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tile server: a preset (osm, arcgis, usgs) or a URL template with {z}/{x}/{y}
    #[arg(long, env = "SLIPEE_TILE_URL")]
    pub tile_url: Option<String>,

    /// Directory for rendered maps
    #[arg(long, env = "SLIPEE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

impl ConfigArgs {
    /// Loads the config file and applies overrides. CLI/env wins.
    pub fn load(&self) -> Result<ConfigFile, CliError> {
        let mut config = match &self.config {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        if let Some(url) = &self.tile_url {
            config.provider.url = url.clone();
        }
        if let Some(dir) = &self.cache_dir {
            config.cache.directory = dir.clone();
        }

        Ok(config)
    }
}

/// Describes one map, as on the `/staticmap` query string.
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Latitude of the map center in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude of the map center in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub long: f64,

    /// Zoom level
    #[arg(long, default_value_t = 12)]
    pub zoom: u8,

    /// Image width in pixels
    #[arg(long, default_value_t = 400)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 300)]
    pub height: u32,

    /// Text drawn in the bottom-right corner
    #[arg(long, default_value = "")]
    pub label: String,
}

impl RequestArgs {
    pub fn to_request(&self) -> MapRequest {
        MapRequest::new(
            self.width,
            self.height,
            self.zoom,
            self.lat,
            self.long,
            self.label.clone(),
        )
    }
}

/// Builds the HTTP tile source from the `[provider]` section.
pub fn build_source(config: &ConfigFile) -> Result<HttpTileSource, CliError> {
    let template = resolve_template(&config.provider.url)?;
    let user_agent = config
        .provider
        .user_agent
        .as_deref()
        .unwrap_or(DEFAULT_USER_AGENT);
    let client = AsyncReqwestClient::with_options(user_agent, config.provider.timeout)?;

    Ok(XyzTileSource::new(template, client))
}

/// Builds the overlays from the `[overlay]` section.
///
/// Presets bring their own attribution when none is configured.
pub fn build_overlays(config: &ConfigFile) -> Result<OverlayFactory, CliError> {
    let attribution = config.overlay.attribution.clone().or_else(|| {
        config
            .provider
            .url
            .parse::<TilePreset>()
            .ok()
            .map(|preset| preset.attribution().to_string())
    });

    let mut overlays = OverlayFactory::default();
    if let Some(attribution) = attribution {
        overlays = overlays.with_attribution(attribution);
    }
    if let Some(font) = &config.overlay.font {
        overlays = overlays.with_font_file(font)?;
    }
    if config.overlay.marker_enabled {
        let marker = match &config.overlay.marker {
            Some(path) => MarkerOverlay::from_file(path)?,
            None => MarkerOverlay::dot()?,
        };
        overlays = overlays.with_marker(marker);
    }

    Ok(overlays)
}

/// Creates the service and its worker from a loaded config.
pub fn build_service(
    config: &ConfigFile,
) -> Result<(Arc<MapService>, GenerationWorker<HttpTileSource>), CliError> {
    let source = build_source(config)?;
    let overlays = build_overlays(config)?;

    info!(
        tile_url = %source.template(),
        cache = %config.cache.directory.display(),
        "Tile source configured"
    );

    StaticMapService::new(config.service_config(), source, overlays)
        .map_err(CliError::ServiceCreation)
}
