//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and the Web Mercator pixel space used by slippy map tile servers.
//!
//! The projection works on a 256 unit wide world at zoom 0. Scaling by
//! `2^zoom` gives absolute pixel coordinates, which split into a tile index
//! and a pixel offset inside that tile.
//!
//! None of these functions validate their input. Latitudes beyond
//! [`LAT_LIMIT`] project outside the tile grid; callers reject them first
//! (see [`crate::request::MapRequest::validate`]). [`locate`] pins its row
//! to the world, so a point exactly on the limit lands in the edge row.

mod types;

pub use types::{
    world_tiles, MercatorPoint, PixelPoint, TileCoord, TileLocation, LAT_LIMIT, MAX_LON, MIN_LON,
    TILE_SIZE,
};

use std::f64::consts::PI;

const WORLD_UNITS: f64 = TILE_SIZE as f64;

/// Projects a geographic coordinate onto the zoom 0 Web Mercator plane.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees
/// * `lon` - Longitude in degrees
#[inline]
pub fn project(lat: f64, lon: f64) -> MercatorPoint {
    let x = ((lon + 180.0) / 360.0) * WORLD_UNITS;

    let lat_rad = lat * PI / 180.0;
    let y = (WORLD_UNITS / (2.0 * PI)) * (PI - (PI / 4.0 + lat_rad / 2.0).tan().ln());

    MercatorPoint { x, y }
}

/// Splits a zoom 0 Mercator value into a tile index and the pixel inside it.
///
/// The absolute pixel is `floor(m * 2^zoom)`. The tile index uses floored
/// division and the pixel uses Euclidean remainder, so the pixel is always in
/// `0..256`, even for negative inputs.
#[inline]
pub fn to_tile_pixel(m: f64, zoom: u8) -> (i64, i64) {
    let absolute = (m * 2.0_f64.powi(zoom as i32)).floor() as i64;
    let size = TILE_SIZE as i64;
    (absolute.div_euclid(size), absolute.rem_euclid(size))
}

/// Resolves a geographic coordinate to its tile and the pixel inside it.
///
/// The row is clamped into the world: at `±LAT_LIMIT` rounding puts the
/// projected y a hair outside `0..256`.
#[inline]
pub fn locate(lat: f64, lon: f64, zoom: u8) -> TileLocation {
    let merc = project(lat, lon);
    let (tile_x, pixel_x) = to_tile_pixel(merc.x, zoom);

    let size = TILE_SIZE as i64;
    let last_row = world_tiles(zoom) - 1;
    let (tile_y, pixel_y) = match to_tile_pixel(merc.y, zoom) {
        (row, _) if row < 0 => (0, 0),
        (row, _) if row > last_row => (last_row, size - 1),
        inside => inside,
    };

    TileLocation {
        tile: TileCoord::new(tile_x, tile_y, zoom),
        pixel: PixelPoint::new(pixel_x, pixel_y),
    }
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Used for float comparison
    fn almost_equal(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12
    }

    #[test]
    fn test_project_chicago() {
        // Reference values from the Google Maps coordinates documentation
        let merc = project(41.85, -87.65);
        assert!(almost_equal(merc.x, 65.67111111111112), "x = {}", merc.x);
        assert!(almost_equal(merc.y, 95.17492654697409), "y = {}", merc.y);
    }

    #[test]
    fn test_project_origin_is_world_center() {
        let merc = project(0.0, 0.0);
        assert!(almost_equal(merc.x, 128.0));
        assert!(almost_equal(merc.y, 128.0));
    }

    #[test]
    fn test_project_latitude_limit_is_square_world() {
        let north = project(LAT_LIMIT, 180.0);
        let south = project(-LAT_LIMIT, -180.0);
        assert!(north.y.abs() < 1e-9);
        assert!((south.y - 256.0).abs() < 1e-9);
        assert!(almost_equal(north.x, 256.0));
        assert!(almost_equal(south.x, 0.0));
    }

    #[test]
    fn test_to_tile_pixel_reference_values() {
        assert_eq!(to_tile_pixel(65.67111111111112, 0), (0, 65));
        assert_eq!(to_tile_pixel(95.17492654697409, 1), (0, 190));
    }

    #[test]
    fn test_to_tile_pixel_higher_zooms() {
        assert_eq!(to_tile_pixel(65.67111111111112, 4), (4, 26));
        assert_eq!(to_tile_pixel(95.17492654697409, 4), (5, 242));
        assert_eq!(to_tile_pixel(65.67111111111112, 10), (262, 175));
        assert_eq!(to_tile_pixel(95.17492654697409, 10), (380, 179));
    }

    #[test]
    fn test_to_tile_pixel_negative_uses_true_modulo() {
        // -0.5 floors to -1, which is the last pixel of tile -1
        assert_eq!(to_tile_pixel(-0.5, 0), (-1, 255));
        assert_eq!(to_tile_pixel(-256.0, 0), (-1, 0));
        assert_eq!(to_tile_pixel(-257.0, 0), (-2, 255));
    }

    #[test]
    fn test_lat_limit() {
        let computed = (PI.sinh().atan() / (2.0 * PI)) * 360.0;
        assert!(almost_equal(computed, LAT_LIMIT));
        assert_eq!(format!("{:.6}", LAT_LIMIT), "85.051129");
    }

    #[test]
    fn test_locate_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let location = locate(40.7128, -74.0060, 16);
        assert_eq!(location.tile, TileCoord::new(19295, 24640, 16));
        assert_eq!(location.pixel, PixelPoint::new(158, 71));
    }

    #[test]
    fn test_locate_chicago_zoom_1() {
        let location = locate(41.85, -87.65, 1);
        assert_eq!(location.tile, TileCoord::new(0, 0, 1));
        assert_eq!(location.pixel, PixelPoint::new(131, 190));
    }

    #[test]
    fn test_locate_pixel_always_within_tile() {
        for zoom in [0, 3, 9, 15, 23] {
            for (lat, lon) in [(84.9, -179.9), (-84.9, 179.9), (0.0, 0.0), (51.5, -0.12)] {
                let location = locate(lat, lon, zoom);
                assert!((0..256).contains(&location.pixel.x));
                assert!((0..256).contains(&location.pixel.y));
                assert!(location.tile.has_valid_row());
            }
        }
    }

    #[test]
    fn test_locate_at_latitude_limits_stays_in_world() {
        for zoom in [0, 3, 10, 23] {
            let last_row = world_tiles(zoom) - 1;

            let north = locate(LAT_LIMIT, 0.0, zoom);
            assert_eq!((north.tile.y, north.pixel.y), (0, 0), "zoom {}", zoom);
            assert!(north.tile.has_valid_row());

            let south = locate(-LAT_LIMIT, 0.0, zoom);
            assert_eq!((south.tile.y, south.pixel.y), (last_row, 255), "zoom {}", zoom);
            assert!(south.tile.has_valid_row());
        }
    }

    #[test]
    fn test_tile_to_lat_lon_northwest_corner() {
        let tile = TileCoord::new(19295, 24640, 16);
        let (lat, lon) = tile_to_lat_lon(&tile);

        assert!(
            (lat - 40.713).abs() < 0.01,
            "Latitude should be close to 40.713"
        );
        assert!(
            (lon - (-74.007)).abs() < 0.01,
            "Longitude should be close to -74.007"
        );
    }

    #[test]
    fn test_roundtrip_at_different_zooms() {
        let lat = 51.5074; // London
        let lon = -0.1278;

        for zoom in [0, 5, 10, 15, 18] {
            let location = locate(lat, lon, zoom);
            let (corner_lat, corner_lon) = tile_to_lat_lon(&location.tile);

            // The corner is north-west of the point, within one tile
            let tile_size_degrees = 360.0 / world_tiles(zoom) as f64;
            assert!(corner_lat >= lat, "zoom {}: corner must be north", zoom);
            assert!(corner_lon <= lon, "zoom {}: corner must be west", zoom);
            assert!((corner_lon - lon).abs() < tile_size_degrees);
        }
    }

    #[test]
    fn test_tile_coord_wrapping() {
        assert_eq!(TileCoord::new(-1, 0, 2).wrapped(), TileCoord::new(3, 0, 2));
        assert_eq!(TileCoord::new(4, 1, 2).wrapped(), TileCoord::new(0, 1, 2));
        assert_eq!(TileCoord::new(2, 1, 2).wrapped(), TileCoord::new(2, 1, 2));
    }

    #[test]
    fn test_tile_coord_row_validity() {
        assert!(TileCoord::new(0, 0, 0).has_valid_row());
        assert!(!TileCoord::new(0, -1, 0).has_valid_row());
        assert!(!TileCoord::new(0, 1, 0).has_valid_row());
        assert!(TileCoord::new(0, 1023, 10).has_valid_row());
    }

    #[test]
    fn test_tile_coord_display() {
        assert_eq!(TileCoord::new(131, 190, 9).to_string(), "9/131/190");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_locate_stays_on_grid(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=23
            ) {
                let location = locate(lat, lon, zoom);
                prop_assert!(location.tile.has_valid_row());
                prop_assert!((0..world_tiles(zoom)).contains(&location.tile.x));
                prop_assert!((0..256).contains(&location.pixel.x));
                prop_assert!((0..256).contains(&location.pixel.y));
            }

            #[test]
            fn test_to_tile_pixel_recombines(m in -512.0..512.0_f64, zoom in 0u8..=18) {
                let (tile, pixel) = to_tile_pixel(m, zoom);
                let absolute = (m * 2.0_f64.powi(zoom as i32)).floor() as i64;
                prop_assert_eq!(tile * 256 + pixel, absolute);
                prop_assert!((0..256).contains(&pixel));
            }

            #[test]
            fn test_corner_is_within_one_tile(
                lat in -85.0..85.0_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=18
            ) {
                let location = locate(lat, lon, zoom);
                let (corner_lat, corner_lon) = tile_to_lat_lon(&location.tile);
                let tile_degrees = 360.0 / world_tiles(zoom) as f64;

                prop_assert!(corner_lon <= lon + 1e-9);
                prop_assert!(lon - corner_lon < tile_degrees + 1e-9);
                prop_assert!(corner_lat >= lat - 1e-9);
            }
        }
    }
}
