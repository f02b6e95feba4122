//! OpenStreetMap raster tile provider.
//!
//! Standard slippy-map server indexed in plain WGS84, so the coordinate
//! transform is the identity.

use super::types::Provider;
use crate::coord::GeoPoint;

const OSM_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// OpenStreetMap tile provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsmProvider;

impl Provider for OsmProvider {
    fn name(&self) -> &str {
        "osm"
    }

    fn url_template(&self) -> &str {
        OSM_URL_TEMPLATE
    }

    fn to_provider_space(&self, point: GeoPoint) -> GeoPoint {
        point
    }

    fn min_zoom(&self) -> u8 {
        1
    }

    fn max_zoom(&self) -> u8 {
        18
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        let p = GeoPoint::new(116.39, 39.91);
        assert_eq!(OsmProvider.to_provider_space(p), p);
    }

    #[test]
    fn test_template_has_all_placeholders() {
        let template = OsmProvider.url_template();
        assert!(template.contains("{x}"));
        assert!(template.contains("{y}"));
        assert!(template.contains("{z}"));
    }
}
