//! Slipee - static map images from slippy map tiles
//!
//! Renders a PNG of a given size centered on a coordinate by stitching
//! 256×256 Web Mercator tiles from an XYZ tile server, drawing a label and a
//! center marker on top, and keeping the result in a content-addressed disk
//! cache. Uncached maps are generated by a single background worker that
//! pauses between requests to stay polite to the tile server.
//!
//! # High-Level API
//!
//! The [`service`] module ties everything together:
//!
//! ```ignore
//! use slipee::provider::{resolve_template, AsyncReqwestClient, XyzTileSource};
//! use slipee::service::{ServiceConfig, StaticMapService, StitchOutcome};
//! use slipee::overlay::OverlayFactory;
//!
//! let source = XyzTileSource::new(resolve_template("osm")?, AsyncReqwestClient::new()?);
//! let config = ServiceConfig::new("/var/cache/slipee");
//! let (service, worker) = StaticMapService::new(config, source, OverlayFactory::default())?;
//! tokio::spawn(worker.run(shutdown.clone()));
//!
//! let path = service.generate_now(&request).await?;
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod logging;
pub mod overlay;
pub mod provider;
pub mod request;
pub mod service;
pub mod stitch;
pub mod telemetry;

/// Version of the Slipee library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
