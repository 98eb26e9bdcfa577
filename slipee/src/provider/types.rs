//! Provider types and traits

use std::future::Future;

use image::RgbaImage;
use thiserror::Error;

use crate::coord::TileCoord;

/// Errors that can occur while fetching a tile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The tile server has no tile at this address (HTTP 404).
    #[error("tile not found at {url}")]
    NotFound { url: String },

    /// The tile server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The request never produced a response (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body is not a usable tile image.
    #[error("could not decode tile: {0}")]
    Decode(String),

    /// The URL template cannot address tiles.
    #[error("invalid URL template: {0}")]
    InvalidTemplate(String),
}

/// Source of decoded map tiles.
///
/// The stitcher only needs "given a tile address, return a decoded 256×256
/// image or an error". Implementations own transport, URL construction and
/// decoding.
pub trait TileSource: Send + Sync {
    /// Fetches and decodes one tile.
    ///
    /// The coordinates are passed through exactly as given; grid planning
    /// decides which addresses are worth asking for.
    fn fetch(&self, tile: TileCoord)
        -> impl Future<Output = Result<RgbaImage, ProviderError>> + Send;

    /// Returns the source's name for logging and identification.
    fn name(&self) -> &str;
}
