//! Canvas assembly from fetched tiles.

use std::time::Instant;

use image::{imageops, RgbaImage};
use thiserror::Error;
use tracing::{debug, trace};

use super::grid::GridPlan;
use crate::coord::{tile_to_lat_lon, TileCoord};
use crate::provider::{ProviderError, TileSource};
use crate::request::MapRequest;

/// Errors that abort a stitch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StitchError {
    /// A tile could not be fetched or decoded. No partial canvas is kept.
    #[error("failed to fetch tile {tile}: {source}")]
    TileFetch {
        tile: TileCoord,
        #[source]
        source: ProviderError,
    },
}

/// A finished canvas and how many tiles went into it.
#[derive(Debug, Clone)]
pub struct StitchedCanvas {
    pub image: RgbaImage,
    pub tiles_fetched: usize,
}

/// Builds canvases by fetching tiles from a [`TileSource`].
///
/// Tiles are fetched one at a time in row-major order. Columns wrap around
/// the antimeridian; rows above or below the world are left transparent.
pub struct Stitcher<S: TileSource> {
    source: S,
}

impl<S: TileSource> Stitcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the underlying tile source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Assembles the canvas for a request.
    ///
    /// The request is expected to have passed validation. The first tile
    /// failure aborts the stitch.
    pub async fn stitch(&self, request: &MapRequest) -> Result<StitchedCanvas, StitchError> {
        let start = Instant::now();
        let plan = GridPlan::for_request(request);

        let (north_west, south_east) = plan.bounds();
        let (north, west) = tile_to_lat_lon(&north_west);
        let (south, east) = tile_to_lat_lon(&south_east);
        debug!(
            source = self.source.name(),
            zoom = plan.zoom,
            tiles = plan.tile_count(),
            north = north,
            west = west,
            south = south,
            east = east,
            "Stitching canvas"
        );

        let mut canvas = RgbaImage::new(request.width(), request.height());
        let mut tiles_fetched = 0;

        for placement in plan.placements() {
            if !placement.tile.has_valid_row() {
                trace!(tile = %placement.tile, "Row outside the world, leaving background");
                continue;
            }

            let tile = placement.tile.wrapped();
            let image = self
                .source
                .fetch(tile)
                .await
                .map_err(|source| StitchError::TileFetch { tile, source })?;

            trace!(
                tile_x = tile.x,
                tile_y = tile.y,
                zoom = tile.zoom,
                left = placement.left,
                top = placement.top,
                "Placing tile"
            );
            imageops::replace(&mut canvas, &image, placement.left, placement.top);
            tiles_fetched += 1;
        }

        debug!(
            tiles_fetched = tiles_fetched,
            duration_ms = start.elapsed().as_millis() as u64,
            "Canvas stitched"
        );

        Ok(StitchedCanvas {
            image: canvas,
            tiles_fetched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::locate;
    use image::Rgba;
    use std::sync::Mutex;

    /// Source that paints each tile with a color derived from its address
    /// and records what was asked for.
    struct PatternSource {
        requested: Mutex<Vec<TileCoord>>,
        fail_on: Option<TileCoord>,
    }

    impl PatternSource {
        fn new() -> Self {
            Self {
                requested: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(tile: TileCoord) -> Self {
            Self {
                requested: Mutex::new(Vec::new()),
                fail_on: Some(tile),
            }
        }

        fn color(tile: TileCoord) -> Rgba<u8> {
            Rgba([(tile.x % 251) as u8, (tile.y % 251) as u8, tile.zoom, 255])
        }

        fn requested(&self) -> Vec<TileCoord> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl TileSource for PatternSource {
        async fn fetch(&self, tile: TileCoord) -> Result<RgbaImage, ProviderError> {
            self.requested.lock().unwrap().push(tile);
            if self.fail_on == Some(tile) {
                return Err(ProviderError::NotFound {
                    url: format!("mock://{}", tile),
                });
            }
            let mut image = RgbaImage::from_pixel(256, 256, Self::color(tile));
            // Mark the top-left pixel so placement can be checked exactly
            image.put_pixel(0, 0, Rgba([255, 0, 255, 255]));
            Ok(image)
        }

        fn name(&self) -> &str {
            "pattern"
        }
    }

    #[tokio::test]
    async fn test_canvas_has_requested_size() {
        let stitcher = Stitcher::new(PatternSource::new());
        let request = MapRequest::new(400, 300, 5, 59.91, 10.75, "");

        let stitched = stitcher.stitch(&request).await.unwrap();
        assert_eq!(stitched.image.dimensions(), (400, 300));
        assert_eq!(stitched.tiles_fetched, stitcher.source().requested().len());
    }

    #[tokio::test]
    async fn test_center_pixel_comes_from_located_tile() {
        let stitcher = Stitcher::new(PatternSource::new());
        let request = MapRequest::new(401, 299, 9, 41.85, -87.65, "");

        let stitched = stitcher.stitch(&request).await.unwrap();
        let location = locate(41.85, -87.65, 9);
        let (cx, cy) = request.center();

        let pixel = stitched.image.get_pixel(cx, cy);
        if location.pixel == crate::coord::PixelPoint::new(0, 0) {
            assert_eq!(*pixel, Rgba([255, 0, 255, 255]));
        } else {
            assert_eq!(*pixel, PatternSource::color(location.tile));
        }

        // The tile's top-left marker sits at center - pixel
        let marker_x = cx as i64 - location.pixel.x;
        let marker_y = cy as i64 - location.pixel.y;
        assert_eq!(
            *stitched.image.get_pixel(marker_x as u32, marker_y as u32),
            Rgba([255, 0, 255, 255])
        );
    }

    #[tokio::test]
    async fn test_zero_size_fetches_nothing() {
        let stitcher = Stitcher::new(PatternSource::new());
        let request = MapRequest::new(0, 0, 12, 59.91, 10.75, "");

        let stitched = stitcher.stitch(&request).await.unwrap();
        assert_eq!(stitched.image.dimensions(), (0, 0));
        assert_eq!(stitched.tiles_fetched, 0);
        assert!(stitcher.source().requested().is_empty());
    }

    #[tokio::test]
    async fn test_columns_wrap_at_antimeridian() {
        let stitcher = Stitcher::new(PatternSource::new());
        let request = MapRequest::new(600, 100, 2, 0.0, 179.9, "");

        stitcher.stitch(&request).await.unwrap();
        for tile in stitcher.source().requested() {
            assert!((0..4).contains(&tile.x), "column {} not wrapped", tile.x);
        }
    }

    #[tokio::test]
    async fn test_rows_outside_world_are_background() {
        let stitcher = Stitcher::new(PatternSource::new());
        // The whole world at zoom 0 is one tile; a tall canvas overhangs it
        let request = MapRequest::new(256, 768, 0, 0.0, 0.0, "");

        let stitched = stitcher.stitch(&request).await.unwrap();
        assert_eq!(stitcher.source().requested(), vec![TileCoord::new(0, 0, 0)]);
        assert_eq!(stitched.tiles_fetched, 1);
        assert_eq!(*stitched.image.get_pixel(128, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*stitched.image.get_pixel(128, 384), PatternSource::color(TileCoord::new(0, 0, 0)));
        assert_eq!(*stitched.image.get_pixel(128, 767), Rgba([0, 0, 0, 0]));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let request = MapRequest::new(400, 300, 1, 41.85, -87.65, "");
        let failing = TileCoord::new(0, 0, 1);
        let stitcher = Stitcher::new(PatternSource::failing_on(failing));

        let result = stitcher.stitch(&request).await;
        match result {
            Err(StitchError::TileFetch { tile, source }) => {
                assert_eq!(tile, failing);
                assert!(matches!(source, ProviderError::NotFound { .. }));
            }
            Ok(_) => panic!("expected stitch to fail"),
        }
        // Nothing after the failing tile was requested
        assert_eq!(stitcher.source().requested().last(), Some(&failing));
    }

    #[test]
    fn test_error_message_names_tile() {
        let err = StitchError::TileFetch {
            tile: TileCoord::new(3, 4, 5),
            source: ProviderError::Transport("timed out".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "failed to fetch tile 5/3/4: transport error: timed out"
        );
    }
}
