//! XYZ tile server source.
//!
//! Fetches tiles from any server that addresses tiles with a
//! `{z}/{x}/{y}` URL template and returns them decoded as RGBA images.
//!
//! # Coordinate System
//!
//! Uses standard Web Mercator XYZ tile coordinates:
//! - X: Column (0 to 2^zoom - 1, west to east)
//! - Y: Row (0 to 2^zoom - 1, north to south)
//! - Z: Zoom level

use image::RgbaImage;
use tracing::debug;

use super::http::AsyncHttpClient;
use super::template::UrlTemplate;
use super::types::{ProviderError, TileSource};
use crate::coord::{TileCoord, TILE_SIZE};

/// Tile source backed by an XYZ tile server.
///
/// # Example
///
/// ```ignore
/// use slipee::provider::{AsyncReqwestClient, UrlTemplate, XyzTileSource};
///
/// let template = UrlTemplate::parse("https://tile.openstreetmap.org/{z}/{x}/{y}.png")?;
/// let source = XyzTileSource::new(template, AsyncReqwestClient::new()?);
/// let tile = source.fetch(TileCoord::new(0, 0, 0)).await?;
/// ```
pub struct XyzTileSource<C: AsyncHttpClient> {
    template: UrlTemplate,
    http_client: C,
    name: String,
}

impl<C: AsyncHttpClient> XyzTileSource<C> {
    /// Creates a new source. The template's host doubles as the source name.
    pub fn new(template: UrlTemplate, http_client: C) -> Self {
        let name = host_of(&template.to_string());
        Self {
            template,
            http_client,
            name,
        }
    }

    /// Overrides the name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }
}

impl<C: AsyncHttpClient> TileSource for XyzTileSource<C> {
    async fn fetch(&self, tile: TileCoord) -> Result<RgbaImage, ProviderError> {
        let url = self.template.url_for(tile);
        let data = self.http_client.get(&url).await?;
        let image = decode_tile(&data)?;

        debug!(
            source = %self.name,
            tile = %tile,
            bytes = data.len(),
            "Tile fetched"
        );

        Ok(image)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Decodes PNG or JPEG tile data and checks that it is a full tile.
pub fn decode_tile(data: &[u8]) -> Result<RgbaImage, ProviderError> {
    let image = image::load_from_memory(data)
        .map_err(|e| ProviderError::Decode(e.to_string()))?
        .to_rgba8();

    if image.width() != TILE_SIZE || image.height() != TILE_SIZE {
        return Err(ProviderError::Decode(format!(
            "tile is {}×{}, expected {}×{}",
            image.width(),
            image.height(),
            TILE_SIZE,
            TILE_SIZE
        )));
    }

    Ok(image)
}

/// Extracts the host part of a URL for naming, falling back to the whole string.
fn host_of(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    rest.split('/').next().unwrap_or(rest).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn encoded_tile(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut buffer = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut buffer), format)
            .unwrap();
        buffer
    }

    fn source(response: Result<Vec<u8>, ProviderError>) -> XyzTileSource<MockAsyncHttpClient> {
        let template = UrlTemplate::parse("https://tiles.example.org/${z}/{X}/{y}.png").unwrap();
        XyzTileSource::new(template, MockAsyncHttpClient::new(response))
    }

    #[tokio::test]
    async fn test_fetch_decodes_png() {
        let source = source(Ok(encoded_tile(256, 256, ImageFormat::Png)));

        let tile = source.fetch(TileCoord::new(131, 190, 9)).await.unwrap();
        assert_eq!(tile.dimensions(), (256, 256));
        assert_eq!(*tile.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
        assert_eq!(
            source.http_client.requested_urls(),
            vec!["https://tiles.example.org/9/131/190.png"]
        );
    }

    #[tokio::test]
    async fn test_fetch_decodes_jpeg() {
        let source = source(Ok(encoded_tile(256, 256, ImageFormat::Jpeg)));
        let tile = source.fetch(TileCoord::new(0, 0, 0)).await.unwrap();
        assert_eq!(tile.dimensions(), (256, 256));
    }

    #[tokio::test]
    async fn test_fetch_rejects_wrong_size() {
        let source = source(Ok(encoded_tile(512, 512, ImageFormat::Png)));
        let result = source.fetch(TileCoord::new(0, 0, 0)).await;
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_garbage() {
        let source = source(Ok(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]));
        let result = source.fetch(TileCoord::new(0, 0, 0)).await;
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_propagates_not_found() {
        let source = source(Err(ProviderError::NotFound {
            url: "https://tiles.example.org/1/5/5.png".to_string(),
        }));
        let result = source.fetch(TileCoord::new(5, 5, 1)).await;
        assert!(matches!(result, Err(ProviderError::NotFound { .. })));
    }

    #[test]
    fn test_name_defaults_to_host() {
        let source = source(Ok(Vec::new()));
        assert_eq!(source.name(), "tiles.example.org");
        assert_eq!(source.with_name("osm").name(), "osm");
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("http://localhost:9022/{z}/{x}/{y}.png"), "localhost:9022");
        assert_eq!(host_of("tiles/{z}/{x}/{y}"), "tiles");
    }
}
