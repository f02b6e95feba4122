//! On-disk tile cache.
//!
//! Raw fetched tiles are persisted under `{output_dir}/{zoom}/{x}/{y}.png`
//! while a run is in progress. After a successful composite the whole
//! `{zoom}` subtree is deleted unless the run was configured to keep the
//! intermediate tiles. Caches left behind by a failed run are not cleaned
//! up; removal is tied to success.

use crate::coord::TileIndex;
use crate::error::MosaicError;
use std::path::{Path, PathBuf};

/// Cache extension; tiles are stored as fetched, the name is nominal.
const TILE_EXT: &str = "png";

/// Tile cache rooted at the run's output directory.
#[derive(Debug, Clone)]
pub struct TileCache {
    root: PathBuf,
}

impl TileCache {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: output_dir.into(),
        }
    }

    /// Path of one cached tile: `{root}/{zoom}/{x}/{y}.png`.
    pub fn tile_path(&self, index: TileIndex) -> PathBuf {
        self.root
            .join(index.zoom.to_string())
            .join(index.x.to_string())
            .join(format!("{}.{}", index.y, TILE_EXT))
    }

    /// Directory holding every cached tile of one zoom level.
    pub fn zoom_dir(&self, zoom: u8) -> PathBuf {
        self.root.join(zoom.to_string())
    }

    /// Writes one tile's raw bytes, creating parent directories as needed.
    pub async fn store(&self, index: TileIndex, bytes: &[u8]) -> Result<(), MosaicError> {
        let path = self.tile_path(index);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| MosaicError::TileCache {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| MosaicError::TileCache { path, source })
    }

    /// Removes the zoom level's whole subtree. Missing subtree is fine.
    pub async fn clear(&self, zoom: u8) -> Result<(), MosaicError> {
        let dir = self.zoom_dir(zoom);

        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(MosaicError::TileCache { path: dir, source }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
