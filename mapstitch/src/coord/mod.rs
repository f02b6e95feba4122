//! Coordinate conversion module
//!
//! Pure conversions between geographic coordinates (longitude/latitude in
//! degrees) and Web Mercator slippy-tile indices. No state, no I/O.

mod types;

pub use types::{
    BoundingBox, CoordError, GeoPoint, TileIndex, TileRect, TileRectIter, MAX_LAT, MAX_LNG,
    MIN_LAT, MIN_LNG, TILE_SIZE,
};

use std::f64::consts::PI;

/// Converts degrees to radians.
#[inline]
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Converts radians to degrees.
#[inline]
pub fn rad_to_deg(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Converts a geographic point to raw (unfloored) tile coordinates.
///
/// `x = (lng + 180) / 360 * 2^zoom` and
/// `y = (1 - ln(tan φ + sec φ) / π) / 2 * 2^zoom` with `φ` the latitude
/// in radians. No bounds clamping: a latitude outside the Mercator range
/// produces a non-finite `y`, which callers must reject rather than cast.
#[inline]
pub fn lng_lat_to_tile(lng: f64, lat: f64, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);
    let lat_rad = deg_to_rad(lat);

    let x = (lng + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;

    (x, y)
}

/// Converts a geographic point to an integral tile index.
///
/// Floors the raw tile coordinates. Errors instead of casting when either
/// coordinate is NaN or infinite (latitude beyond the Mercator range).
#[inline]
pub fn tile_index(lng: f64, lat: f64, zoom: u8) -> Result<(i32, i32), CoordError> {
    let (x, y) = lng_lat_to_tile(lng, lat, zoom);

    if !x.is_finite() || !y.is_finite() {
        return Err(CoordError::NonFiniteTile { lng, lat });
    }

    Ok((x.floor() as i32, y.floor() as i32))
}

/// Converts a tile index back to geographic coordinates.
///
/// Returns the longitude/latitude of the tile's northwest corner.
/// Provided for completeness and testing; not on the hot path.
#[inline]
pub fn tile_to_lng_lat(x: i32, y: i32, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);

    let lng = x as f64 / n * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y as f64 / n)).sinh().atan();

    (lng, rad_to_deg(lat_rad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let (x, y) = tile_index(-74.0060, 40.7128, 16).unwrap();
        assert_eq!(x, 19295);
        assert_eq!(y, 24640);
    }

    #[test]
    fn test_world_corners_at_zoom_1() {
        let (x, y) = tile_index(-180.0, 85.05, 1).unwrap();
        assert_eq!((x, y), (0, 0));

        let (x, y) = tile_index(179.9999, -85.05, 1).unwrap();
        assert_eq!((x, y), (1, 1));
    }

    #[test]
    fn test_latitude_beyond_mercator_range_is_rejected() {
        // tan + sec goes negative past the pole, so ln() yields NaN
        let result = tile_index(0.0, 91.0, 10);
        assert!(matches!(
            result,
            Err(CoordError::NonFiniteTile { lat, .. }) if lat == 91.0
        ));

        let result = tile_index(0.0, -91.0, 10);
        assert!(result.is_err());
    }

    #[test]
    fn test_tile_to_lng_lat_northwest_corner() {
        let (lng, lat) = tile_to_lng_lat(19295, 24640, 16);

        // Northwest corner of the NYC tile, close to but not exactly the city
        assert!((lat - 40.713).abs() < 0.01);
        assert!((lng - (-74.007)).abs() < 0.01);
    }

    #[test]
    fn test_roundtrip_within_one_tile() {
        // Tile quantization loses at most one tile's angular size
        let lng = -0.1278; // London
        let lat = 51.5074;

        for zoom in [1, 5, 10, 15, 18] {
            let (x, y) = tile_index(lng, lat, zoom).unwrap();
            let (back_lng, back_lat) = tile_to_lng_lat(x, y, zoom);

            let tile_size_degrees = 360.0 / 2.0_f64.powi(zoom as i32);

            assert!(
                (back_lng - lng).abs() < tile_size_degrees,
                "zoom {}: lng diff {} exceeds tile size {}",
                zoom,
                (back_lng - lng).abs(),
                tile_size_degrees
            );
            assert!(
                (back_lat - lat).abs() < tile_size_degrees,
                "zoom {}: lat diff {} exceeds tile size {}",
                zoom,
                (back_lat - lat).abs(),
                tile_size_degrees
            );
        }
    }

    #[test]
    fn test_degree_radian_helpers() {
        assert!((deg_to_rad(180.0) - PI).abs() < 1e-12);
        assert!((rad_to_deg(PI) - 180.0).abs() < 1e-12);
        assert!((rad_to_deg(deg_to_rad(37.5)) - 37.5).abs() < 1e-12);
    }
}
