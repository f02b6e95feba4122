//! Provider types and traits

use crate::coord::GeoPoint;
use std::fmt;

/// Errors that can occur while talking to a tile provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed or returned a non-success status
    HttpError(String),
    /// Response body was not usable
    InvalidResponse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Capability interface for a slippy-map tile provider.
///
/// A provider contributes exactly two things: a URL template with
/// `{x}`/`{y}`/`{z}` placeholders, and the transform from WGS84 into the
/// coordinate space its tile grid is indexed in. Adding a provider means
/// implementing this trait; nothing else in the engine changes.
pub trait Provider: Send + Sync {
    /// Returns the provider's name for logging and identification.
    fn name(&self) -> &str;

    /// Returns the tile URL template with `{x}`, `{y}` and `{z}` placeholders.
    fn url_template(&self) -> &str;

    /// Maps a WGS84 point into the provider's coordinate space.
    ///
    /// Identity for providers whose tile grid is indexed in plain WGS84.
    fn to_provider_space(&self, point: GeoPoint) -> GeoPoint;

    /// Returns the minimum supported zoom level.
    fn min_zoom(&self) -> u8;

    /// Returns the maximum supported zoom level.
    fn max_zoom(&self) -> u8;

    /// Clamps a requested zoom level into this provider's supported range.
    fn clamp_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.min_zoom(), self.max_zoom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRange;

    impl Provider for FixedRange {
        fn name(&self) -> &str {
            "fixed"
        }

        fn url_template(&self) -> &str {
            "http://t/{z}/{x}/{y}"
        }

        fn to_provider_space(&self, point: GeoPoint) -> GeoPoint {
            point
        }

        fn min_zoom(&self) -> u8 {
            3
        }

        fn max_zoom(&self) -> u8 {
            15
        }
    }

    #[test]
    fn test_clamp_zoom() {
        let p = FixedRange;
        assert_eq!(p.clamp_zoom(1), 3);
        assert_eq!(p.clamp_zoom(10), 10);
        assert_eq!(p.clamp_zoom(22), 15);
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::HttpError("HTTP 404 from http://t/1/2/3".to_string());
        assert_eq!(format!("{}", err), "HTTP error: HTTP 404 from http://t/1/2/3");
    }
}
