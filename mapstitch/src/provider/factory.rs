//! Provider factory for centralized provider creation.
//!
//! Selecting a provider implies both a URL template and a coordinate
//! transform; this module keeps that pairing in one place. New providers
//! are added as new enum variants without modifying existing code.

use super::amap::AMapProvider;
use super::baidu::BaiduProvider;
use super::osm::OsmProvider;
use super::types::Provider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for creating a provider.
///
/// Serializes to a lowercase name so it can live in the JSON config file.
///
/// # Example
///
/// ```
/// use mapstitch::provider::ProviderConfig;
///
/// let provider = ProviderConfig::AMap.create();
/// assert_eq!(provider.name(), "amap");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderConfig {
    /// OpenStreetMap raster tiles (WGS84 grid).
    Osm,
    /// AutoNavi satellite imagery (GCJ02 grid).
    AMap,
    /// Baidu satellite imagery (BD09 grid).
    Baidu,
}

impl ProviderConfig {
    /// Creates the configured provider.
    pub fn create(&self) -> Arc<dyn Provider> {
        match self {
            ProviderConfig::Osm => Arc::new(OsmProvider),
            ProviderConfig::AMap => Arc::new(AMapProvider),
            ProviderConfig::Baidu => Arc::new(BaiduProvider),
        }
    }
}

impl fmt::Display for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Osm => write!(f, "osm"),
            ProviderConfig::AMap => write!(f, "amap"),
            ProviderConfig::Baidu => write!(f, "baidu"),
        }
    }
}
