//! Coordinate type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;

/// Pixel side length of one slippy tile.
pub const TILE_SIZE: u32 = 256;

/// A geographic point in degrees.
///
/// Longitude first, matching the `lng,lat` order used in provider URLs
/// and output file names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in degrees (east positive)
    pub lng: f64,
    /// Latitude in degrees (north positive)
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lng, self.lat)
    }
}

/// A geographic bounding box given as two corner points.
///
/// The corners are named for the conventional orientation but no ordering
/// is enforced on the raw values: resolution takes min/max per axis, so a
/// box with swapped corners still resolves to the same tile rectangle.
/// Output file names embed the corners exactly as supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: GeoPoint,
    pub bottom_right: GeoPoint,
}

impl BoundingBox {
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }
}

/// Tile index in the Web Mercator / slippy map grid.
///
/// Always derived from a geographic point and a zoom level, never
/// constructed from user input directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    /// X coordinate (east-west), 0 at the antimeridian
    pub x: i32,
    /// Y coordinate (north-south), 0 at the north edge
    pub y: i32,
    /// Zoom level
    pub zoom: u8,
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})@{}", self.x, self.y, self.zoom)
    }
}

/// Inclusive rectangle of tile indices covering a bounding box at one zoom.
///
/// Derived once per run from the two corner points. Owns no tile data;
/// it is a pure index range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
    pub zoom: u8,
}

impl TileRect {
    /// Width of the rectangle in tiles.
    #[inline]
    pub fn width(&self) -> u32 {
        (self.x_max - self.x_min + 1) as u32
    }

    /// Height of the rectangle in tiles.
    #[inline]
    pub fn height(&self) -> u32 {
        (self.y_max - self.y_min + 1) as u32
    }

    /// Total number of tiles in the rectangle.
    #[inline]
    pub fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// An inclusive rectangle always holds at least one tile.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Width of the rendered mosaic in pixels.
    #[inline]
    pub fn pixel_width(&self) -> u32 {
        self.width() * TILE_SIZE
    }

    /// Height of the rendered mosaic in pixels.
    #[inline]
    pub fn pixel_height(&self) -> u32 {
        self.height() * TILE_SIZE
    }

    /// Returns an iterator over all tile indices in the rectangle.
    ///
    /// Tiles are yielded in row-major order (y_min row first, x ascending).
    pub fn tiles(&self) -> TileRectIter {
        TileRectIter {
            rect: *self,
            next_x: self.x_min,
            next_y: self.y_min,
            done: false,
        }
    }
}

/// Iterator over all tile indices in a [`TileRect`], row-major.
#[derive(Debug, Clone)]
pub struct TileRectIter {
    rect: TileRect,
    next_x: i32,
    next_y: i32,
    done: bool,
}

impl Iterator for TileRectIter {
    type Item = TileIndex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let index = TileIndex {
            x: self.next_x,
            y: self.next_y,
            zoom: self.rect.zoom,
        };

        if self.next_x < self.rect.x_max {
            self.next_x += 1;
        } else if self.next_y < self.rect.y_max {
            self.next_x = self.rect.x_min;
            self.next_y += 1;
        } else {
            self.done = true;
        }

        Some(index)
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// The tile coordinate computed for a point is NaN or infinite,
    /// which happens when the latitude lies outside the Mercator range.
    NonFiniteTile { lng: f64, lat: f64 },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::NonFiniteTile { lng, lat } => {
                write!(
                    f,
                    "tile coordinate for point {},{} is not finite (latitude outside \
                     the Mercator range {}..{}?)",
                    lng, lat, MIN_LAT, MAX_LAT
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
