//! Tile grid planning.
//!
//! Works out which tiles cover a canvas and where each one is drawn. This is
//! pure arithmetic; fetching and compositing live in the stitcher.
//!
//! Per axis, with `c` the canvas center and `p` the requested point's pixel
//! inside its tile:
//!
//! ```text
//! offset = -(256 - (c - p) mod 256)      normalized into (-256, 0]
//! count  = ceil((size - offset) / 256)   0 for an empty axis
//! start  = tile - (c - offset) / 256
//! ```
//!
//! Tile `start + i` is drawn at `offset + 256 * i`. Every drawn tile
//! intersects the canvas and together they cover it exactly once.

use crate::coord::{locate, TileCoord, TILE_SIZE};
use crate::request::MapRequest;

const TILE: i64 = TILE_SIZE as i64;

/// Tile layout along one canvas axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisPlan {
    /// Canvas position of the first tile's leading edge, in `(-256, 0]`.
    pub offset: i64,
    /// Number of tiles along the axis.
    pub count: i64,
    /// Tile index of the first tile, not wrapped.
    pub start: i64,
}

impl AxisPlan {
    /// Plans one axis.
    ///
    /// # Arguments
    ///
    /// * `size` - Canvas length in pixels
    /// * `center` - Canvas position of the requested point
    /// * `tile` - Tile index containing the requested point
    /// * `pixel` - Position of the requested point inside that tile
    pub fn new(size: u32, center: i64, tile: i64, pixel: i64) -> Self {
        let mut offset = -(TILE - (center - pixel).rem_euclid(TILE));
        if offset == -TILE {
            // The leading tile would end exactly at the canvas edge
            offset = 0;
        }

        let count = if size == 0 {
            0
        } else {
            (size as i64 - offset + TILE - 1) / TILE
        };

        let start = tile - (center - offset) / TILE;

        Self {
            offset,
            count,
            start,
        }
    }

    /// Canvas position of the `i`-th tile's leading edge.
    #[inline]
    pub fn position(&self, i: i64) -> i64 {
        self.offset + TILE * i
    }
}

/// One tile to fetch and the canvas position of its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    /// Grid address, column not yet wrapped.
    pub tile: TileCoord,
    pub left: i64,
    pub top: i64,
}

/// Complete tile layout for a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPlan {
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    pub x: AxisPlan,
    pub y: AxisPlan,
}

impl GridPlan {
    /// Plans the grid for a request.
    pub fn for_request(request: &MapRequest) -> Self {
        let location = locate(request.latitude(), request.longitude(), request.zoom());
        let (center_x, center_y) = request.center();

        Self {
            zoom: request.zoom(),
            width: request.width(),
            height: request.height(),
            x: AxisPlan::new(
                request.width(),
                center_x as i64,
                location.tile.x,
                location.pixel.x,
            ),
            y: AxisPlan::new(
                request.height(),
                center_y as i64,
                location.tile.y,
                location.pixel.y,
            ),
        }
    }

    /// Total number of grid cells, including rows outside the world.
    pub fn tile_count(&self) -> usize {
        (self.x.count * self.y.count) as usize
    }

    /// Top-left and one-past-bottom-right tile addresses, unwrapped.
    pub fn bounds(&self) -> (TileCoord, TileCoord) {
        (
            TileCoord::new(self.x.start, self.y.start, self.zoom),
            TileCoord::new(
                self.x.start + self.x.count,
                self.y.start + self.y.count,
                self.zoom,
            ),
        )
    }

    /// Row-major list of placements.
    pub fn placements(&self) -> Vec<TilePlacement> {
        let mut placements = Vec::with_capacity(self.tile_count());
        for dy in 0..self.y.count {
            for dx in 0..self.x.count {
                placements.push(TilePlacement {
                    tile: TileCoord::new(self.x.start + dx, self.y.start + dy, self.zoom),
                    left: self.x.position(dx),
                    top: self.y.position(dy),
                });
            }
        }
        placements
    }
}
