//! Coordinate type definitions

use std::fmt;

/// Edge length of a slippy map tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Latitude limit of the Web Mercator projection in degrees.
///
/// Equals `atan(sinh(π)) / (2π) * 360`, the latitude at which the projected
/// world becomes square.
pub const LAT_LIMIT: f64 = 85.051_128_779_806_59;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Position in the zoom 0 Web Mercator plane, where the world is 256 units wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorPoint {
    /// Distance from the antimeridian, eastwards (0.0 to 256.0)
    pub x: f64,
    /// Distance from the northern latitude limit, southwards (0.0 to 256.0)
    pub y: f64,
}

/// Integer pixel position, either inside a tile or on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Tile coordinates in the slippy map grid.
///
/// Indices are signed so that grid arithmetic around the edges of the world
/// never underflows; callers decide how to treat indices outside
/// `0..2^zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// X coordinate (west to east), 0 at the antimeridian
    pub x: i64,
    /// Y coordinate (north to south), 0 at the northern latitude limit
    pub y: i64,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    pub fn new(x: i64, y: i64, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Number of tiles along one axis of the world at this zoom level.
    #[inline]
    pub fn world_size(&self) -> i64 {
        world_tiles(self.zoom)
    }

    /// Returns true if the row exists in the tile grid.
    #[inline]
    pub fn has_valid_row(&self) -> bool {
        (0..self.world_size()).contains(&self.y)
    }

    /// Returns the same tile with the column wrapped into `0..2^zoom`.
    ///
    /// The world repeats horizontally, so a column left of the antimeridian
    /// is the same tile as its wrapped counterpart.
    #[inline]
    pub fn wrapped(&self) -> Self {
        Self {
            x: self.x.rem_euclid(self.world_size()),
            y: self.y,
            zoom: self.zoom,
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A geographic position resolved to a tile and the pixel inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLocation {
    pub tile: TileCoord,
    /// Pixel inside `tile`, each axis in `0..256`
    pub pixel: PixelPoint,
}

/// Number of tiles along one axis of the world at `zoom`.
#[inline]
pub fn world_tiles(zoom: u8) -> i64 {
    1_i64 << zoom
}
