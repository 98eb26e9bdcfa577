//! Map tile source abstraction
//!
//! This module provides the [`TileSource`] trait the stitcher fetches tiles
//! through, and an implementation for XYZ tile servers addressed by a URL
//! template.
//!
//! ```ignore
//! use slipee::provider::{resolve_template, AsyncReqwestClient, XyzTileSource};
//!
//! let template = resolve_template("osm")?;
//! let source = XyzTileSource::new(template, AsyncReqwestClient::new()?);
//! ```

mod http;
mod presets;
mod template;
mod types;
mod xyz;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use presets::{resolve_template, TilePreset};
pub use template::UrlTemplate;
pub use types::{ProviderError, TileSource};
pub use xyz::{decode_tile, XyzTileSource};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
