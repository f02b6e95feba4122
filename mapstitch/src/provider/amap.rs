//! AutoNavi (AMap) satellite imagery provider.
//!
//! AMap tiles are indexed on a GCJ02 grid, so WGS84 input points are run
//! through the GCJ02 distortion before tile resolution. Points outside
//! the distortion's coverage rectangle pass through unchanged.

use super::types::Provider;
use crate::coord::GeoPoint;
use crate::datum;

const AMAP_URL_TEMPLATE: &str =
    "http://webst03.is.autonavi.com/appmaptile?style=6&x={x}&y={y}&z={z}";

/// AutoNavi satellite tile provider (GCJ02 grid).
#[derive(Debug, Default, Clone, Copy)]
pub struct AMapProvider;

impl Provider for AMapProvider {
    fn name(&self) -> &str {
        "amap"
    }

    fn url_template(&self) -> &str {
        AMAP_URL_TEMPLATE
    }

    fn to_provider_space(&self, point: GeoPoint) -> GeoPoint {
        datum::wgs84_to_gcj02(point)
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
    fn test_applies_gcj02_inside_coverage() {
        let p = GeoPoint::new(116.3913, 39.9075);
        let shifted = AMapProvider.to_provider_space(p);
        assert_ne!(shifted, p);
        assert_eq!(shifted, datum::wgs84_to_gcj02(p));
    }

    #[test]
    fn test_identity_outside_coverage() {
        let p = GeoPoint::new(-74.0060, 40.7128);
        assert_eq!(AMapProvider.to_provider_space(p), p);
    }
}
