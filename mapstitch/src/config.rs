//! Run configuration.
//!
//! One explicit value passed into the orchestrator at construction; there
//! is no process-wide configuration state. The struct round-trips through
//! JSON for the CLI's config-file workflow, with every field defaulted so
//! partial files keep working as fields are added.

use crate::coord::{BoundingBox, GeoPoint};
use crate::mosaic::CompositeMode;
use crate::provider::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one mosaic run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Which tile provider to fetch from (implies URL template and datum).
    pub provider: ProviderConfig,

    /// Requested zoom level; clamped into the provider's supported range
    /// at the start of a run.
    pub zoom: u8,

    /// Top-left corner of the requested area, WGS84 degrees.
    pub top_left: GeoPoint,

    /// Bottom-right corner of the requested area, WGS84 degrees.
    pub bottom_right: GeoPoint,

    /// Directory receiving the mosaic and the per-tile cache.
    pub output_dir: PathBuf,

    /// Maximum concurrent tile downloads (minimum 1).
    pub concurrency: usize,

    /// Keep the per-tile cache after a successful stitch.
    pub keep_tiles: bool,

    /// Compositing discipline.
    pub composite_mode: CompositeMode,
}

impl MosaicConfig {
    /// The requested area as a bounding box, corners exactly as supplied.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.top_left, self.bottom_right)
    }
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::AMap,
            zoom: 18,
            top_left: GeoPoint::new(116.385313, 39.921463),
            bottom_right: GeoPoint::new(116.39628, 39.91186),
            output_dir: PathBuf::from("."),
            concurrency: 4,
            keep_tiles: false,
            composite_mode: CompositeMode::Batch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_json() {
        let config = MosaicConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: MosaicConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.provider, config.provider);
        assert_eq!(back.zoom, config.zoom);
        assert_eq!(back.top_left, config.top_left);
        assert_eq!(back.output_dir, config.output_dir);
        assert_eq!(back.composite_mode, CompositeMode::Batch);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: MosaicConfig =
            serde_json::from_str(r#"{"provider": "osm", "zoom": 12}"#).unwrap();

        assert_eq!(config.provider, ProviderConfig::Osm);
        assert_eq!(config.zoom, 12);
        assert_eq!(config.concurrency, 4);
        assert!(!config.keep_tiles);
    }

    #[test]
    fn test_streaming_mode_from_json() {
        let config: MosaicConfig =
            serde_json::from_str(r#"{"composite_mode": "streaming"}"#).unwrap();
        assert_eq!(config.composite_mode, CompositeMode::Streaming);
    }
}
