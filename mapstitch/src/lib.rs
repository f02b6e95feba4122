//! mapstitch - slippy-map tile mosaic engine
//!
//! Fetches rectangular sets of map tiles from slippy-map tile servers and
//! composites them into a single raster covering a requested geographic
//! bounding box. Supports providers whose tile grids are indexed in
//! datums other than WGS84 (GCJ02, BD09) via a per-provider coordinate
//! transform.
//!
//! # High-Level API
//!
//! ```ignore
//! use mapstitch::config::MosaicConfig;
//! use mapstitch::orchestrator::MosaicOrchestrator;
//! use mapstitch::provider::ReqwestTileClient;
//! use std::sync::Arc;
//!
//! let client = Arc::new(ReqwestTileClient::new()?);
//! let mut orchestrator = MosaicOrchestrator::new(MosaicConfig::default(), client);
//! let output = orchestrator.run().await?;
//! ```

pub mod config;
pub mod coord;
pub mod datum;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod mosaic;
pub mod orchestrator;
pub mod progress;
pub mod provider;
pub mod resolver;

/// Version of the mapstitch library and CLI.
///
/// Synchronized across the workspace; injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
