//! Error types for the mosaic engine.
//!
//! Every variant here is fatal to the run: the orchestrator aborts on the
//! first one, transitions to its failed state and persists no output
//! raster. Zoom levels outside a provider's range are the one recoverable
//! condition and are clamped at configuration time instead of surfacing
//! here.

use crate::mosaic::SinkError;
use crate::provider::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during a mosaic run.
#[derive(Debug, Error)]
pub enum MosaicError {
    /// A corner of the bounding box resolved to a non-finite tile
    /// coordinate, i.e. its latitude lies outside the Mercator range.
    #[error("invalid bounding box: tile coordinate for {lng},{lat} is not finite")]
    InvalidBoundingBox { lng: f64, lat: f64 },

    /// Network failure or non-success status for one tile.
    #[error("tile ({x}, {y}) at zoom {zoom} failed to fetch from {url}: {source}")]
    TileFetch {
        x: i32,
        y: i32,
        zoom: u8,
        url: String,
        source: ProviderError,
    },

    /// Fetched bytes could not be decoded into pixel bands.
    #[error("tile ({x}, {y}) at zoom {zoom} failed to decode: {source}")]
    TileDecode {
        x: i32,
        y: i32,
        zoom: u8,
        source: image::ImageError,
    },

    /// A decoded tile is not the expected 256×256 samples per band.
    #[error("tile ({x}, {y}) decoded to {width}x{height}, expected 256x256")]
    BandSizeMismatch {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    /// The output raster sink rejected a write.
    #[error("output raster write failed: {0}")]
    OutputWrite(#[from] SinkError),

    /// Persisting or clearing the on-disk tile cache failed.
    #[error("tile cache operation failed at {path}: {source}")]
    TileCache {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unexpected internal condition (e.g. a worker panicked).
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_carries_index_and_url() {
        let err = MosaicError::TileFetch {
            x: 3,
            y: 4,
            zoom: 12,
            url: "http://t/12/3/4".to_string(),
            source: ProviderError::HttpError("HTTP 502".to_string()),
        };

        let message = err.to_string();
        assert!(message.contains("(3, 4)"));
        assert!(message.contains("http://t/12/3/4"));
        assert!(message.contains("502"));
    }

    #[test]
    fn test_band_size_mismatch_message() {
        let err = MosaicError::BandSizeMismatch {
            x: 0,
            y: 1,
            width: 512,
            height: 512,
        };
        assert_eq!(
            err.to_string(),
            "tile (0, 1) decoded to 512x512, expected 256x256"
        );
    }
}
