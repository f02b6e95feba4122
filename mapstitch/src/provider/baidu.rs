//! Baidu satellite imagery provider.
//!
//! Baidu tiles are indexed on a BD09 grid: GCJ02 with an additional
//! provider-specific offset. WGS84 input points go through the full
//! WGS84 → GCJ02 → BD09 chain before tile resolution.

use super::types::Provider;
use crate::coord::GeoPoint;
use crate::datum;

const BAIDU_URL_TEMPLATE: &str = "https://maponline1.bdimg.com/starpic/?qt=satepc&u=x={x};y={y};z={z};v=009;type=sate&fm=46&udt=20210927";

/// Baidu satellite tile provider (BD09 grid).
#[derive(Debug, Default, Clone, Copy)]
pub struct BaiduProvider;

impl Provider for BaiduProvider {
    fn name(&self) -> &str {
        "baidu"
    }

    fn url_template(&self) -> &str {
        BAIDU_URL_TEMPLATE
    }

    fn to_provider_space(&self, point: GeoPoint) -> GeoPoint {
        datum::wgs84_to_bd09(point)
    }

    fn min_zoom(&self) -> u8 {
        1
    }

    fn max_zoom(&self) -> u8 {
        23
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applies_bd09_chain_inside_coverage() {
        let p = GeoPoint::new(116.3913, 39.9075);
        let shifted = BaiduProvider.to_provider_space(p);
        assert_eq!(shifted, datum::wgs84_to_bd09(p));
        // BD09 bias is noticeably larger than the GCJ02 shift alone
        assert!((shifted.lng - p.lng).abs() > 1e-3);
    }

    #[test]
    fn test_supports_deep_zoom() {
        assert_eq!(BaiduProvider.max_zoom(), 23);
        assert_eq!(BaiduProvider.clamp_zoom(23), 23);
    }
}
