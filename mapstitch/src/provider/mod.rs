//! Map tile provider abstraction
//!
//! Traits and implementations for the supported slippy-map tile servers.
//! A provider bundles a URL template with the datum transform that maps
//! WGS84 input coordinates onto the provider's tile grid.
//!
//! # Factory Pattern
//!
//! For centralized provider creation, use [`ProviderConfig`]:
//!
//! ```
//! use mapstitch::provider::ProviderConfig;
//!
//! let provider = ProviderConfig::Baidu.create();
//! assert_eq!(provider.max_zoom(), 23);
//! ```

mod amap;
mod baidu;
mod factory;
mod http;
mod osm;
mod types;

pub use amap::AMapProvider;
pub use baidu::BaiduProvider;
pub use factory::ProviderConfig;
pub use http::{AsyncHttpClient, ReqwestTileClient};
pub use osm::OsmProvider;
pub use types::{Provider, ProviderError};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
