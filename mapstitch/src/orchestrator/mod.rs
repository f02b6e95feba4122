//! Mosaic run orchestration.
//!
//! Sequences one run end to end: resolve the tile rectangle, fetch every
//! tile under bounded concurrency, composite into the output raster,
//! write the raster file, and finally drop the per-tile cache unless the
//! run keeps it. Progress for both phases streams out through an optional
//! channel.
//!
//! The run is a linear state machine with no back-edges:
//!
//! ```text
//! Idle → AddressResolved → Fetching → Fetched → Compositing
//!      → Composited → Flushed → [TileCacheCleared] → Done
//! ```
//!
//! `Failed` is entered from any state on the first error; `Failed` and
//! `Done` are terminal. On failure no output raster is written, since the
//! mosaic file only exists once a run has fully composited. Tile cache
//! files already on disk are left alone; cache cleanup is tied to
//! success.

use crate::config::MosaicConfig;
use crate::coord::BoundingBox;
use crate::error::MosaicError;
use crate::fetch::{self, FetchConfig, TileCache};
use crate::mosaic::{self, CompositeMode, MosaicImage, RasterSink, StreamingCompositor};
use crate::progress::{Phase, ProgressEvent, ProgressTracker};
use crate::provider::{AsyncHttpClient, Provider};
use crate::resolver;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Lifecycle state of a mosaic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicState {
    Idle,
    AddressResolved,
    Fetching,
    Fetched,
    Compositing,
    Composited,
    Flushed,
    TileCacheCleared,
    Done,
    Failed,
}

/// Drives one mosaic run from configuration to finished raster.
pub struct MosaicOrchestrator<C: AsyncHttpClient + 'static> {
    config: MosaicConfig,
    provider: Arc<dyn Provider>,
    client: Arc<C>,
    progress: Option<UnboundedSender<ProgressEvent>>,
    state: MosaicState,
}

impl<C: AsyncHttpClient + 'static> MosaicOrchestrator<C> {
    /// Creates an orchestrator for the given configuration.
    ///
    /// The provider is instantiated from the config's selector; the HTTP
    /// client is supplied by the caller so tests can inject mocks.
    pub fn new(config: MosaicConfig, client: Arc<C>) -> Self {
        let provider = config.provider.create();
        Self {
            config,
            provider,
            client,
            progress: None,
            state: MosaicState::Idle,
        }
    }

    /// Attaches a progress event channel.
    pub fn with_progress(mut self, tx: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MosaicState {
        self.state
    }

    /// Runs the mosaic to completion.
    ///
    /// Returns the path of the written raster file. Any error leaves the
    /// orchestrator in the terminal `Failed` state.
    pub async fn run(&mut self) -> Result<PathBuf, MosaicError> {
        match self.execute().await {
            Ok(path) => {
                self.state = MosaicState::Done;
                Ok(path)
            }
            Err(err) => {
                self.state = MosaicState::Failed;
                Err(err)
            }
        }
    }

    async fn execute(&mut self) -> Result<PathBuf, MosaicError> {
        // Zoom outside the provider's range is recovered here by
        // clamping, not surfaced as an error.
        let zoom = self.provider.clamp_zoom(self.config.zoom);
        if zoom != self.config.zoom {
            warn!(
                requested = self.config.zoom,
                clamped = zoom,
                provider = self.provider.name(),
                "zoom outside provider range, clamped"
            );
        }

        let bbox = self.config.bounding_box();
        let rect = resolver::resolve(&bbox, zoom, self.provider.as_ref())?;
        self.state = MosaicState::AddressResolved;

        info!(
            provider = self.provider.name(),
            zoom = zoom,
            tiles_wide = rect.width(),
            tiles_high = rect.height(),
            pixels_wide = rect.pixel_width(),
            pixels_high = rect.pixel_height(),
            "tile rectangle resolved"
        );

        let output_path = self.output_path(zoom, &bbox);
        let sink = MosaicImage::create(rect.pixel_width(), rect.pixel_height());
        let cache = Arc::new(TileCache::new(&self.config.output_dir));

        let fetch_progress = Arc::new(ProgressTracker::new(
            Phase::Fetching,
            rect.len(),
            self.progress.clone(),
        ));
        let composite_progress = Arc::new(ProgressTracker::new(
            Phase::Compositing,
            rect.len(),
            self.progress.clone(),
        ));
        let fetch_config = FetchConfig::new(self.config.concurrency);

        self.state = MosaicState::Fetching;

        let mut sink = match self.config.composite_mode {
            CompositeMode::Batch => {
                let tiles = fetch::fetch_all(
                    Arc::clone(&self.client),
                    Arc::clone(&self.provider),
                    rect,
                    fetch_config,
                    Some(Arc::clone(&cache)),
                    fetch_progress,
                )
                .await?;
                self.state = MosaicState::Fetched;

                self.state = MosaicState::Compositing;
                let mut sink = sink;
                mosaic::composite(&tiles, &rect, &mut sink, &composite_progress)?;
                sink
            }
            CompositeMode::Streaming => {
                // Tiles are written as workers deliver them; the two
                // phases interleave and settle together.
                let compositor =
                    Arc::new(StreamingCompositor::new(sink, rect, composite_progress));
                let writer = Arc::clone(&compositor);

                fetch::fetch_each(
                    Arc::clone(&self.client),
                    Arc::clone(&self.provider),
                    rect,
                    fetch_config,
                    Some(Arc::clone(&cache)),
                    fetch_progress,
                    move |index, tile| writer.write_tile(index, &tile),
                )
                .await?;
                self.state = MosaicState::Fetched;
                self.state = MosaicState::Compositing;

                Arc::try_unwrap(compositor)
                    .map_err(|_| {
                        MosaicError::Internal("streaming compositor still shared".to_string())
                    })?
                    .into_sink()
            }
        };
        self.state = MosaicState::Composited;

        sink.flush()?;
        sink.save(&output_path)?;
        self.state = MosaicState::Flushed;

        info!(path = %output_path.display(), "mosaic written");

        if !self.config.keep_tiles {
            cache.clear(zoom).await?;
            self.state = MosaicState::TileCacheCleared;
        }

        Ok(output_path)
    }

    /// Output file path: `{output_dir}/{zoom}-{topLeft},{bottomRight}.tif`.
    ///
    /// The corner points appear exactly as configured; a box supplied in
    /// unconventional corner order resolves correctly but names the file
    /// in that same order.
    fn output_path(&self, zoom: u8, bbox: &BoundingBox) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}-{},{}.tif", zoom, bbox.top_left, bbox.bottom_right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;

    #[test]
    fn test_new_orchestrator_is_idle() {
        let client = Arc::new(MockAsyncHttpClient {
            response: Ok(vec![]),
        });
        let orchestrator = MosaicOrchestrator::new(MosaicConfig::default(), client);
        assert_eq!(orchestrator.state(), MosaicState::Idle);
    }

    #[tokio::test]
    async fn test_invalid_bounding_box_fails_before_any_fetch() {
        let client = Arc::new(MockAsyncHttpClient {
            response: Err(crate::provider::ProviderError::HttpError(
                "must never be called".to_string(),
            )),
        });

        let config = MosaicConfig {
            top_left: crate::coord::GeoPoint::new(0.0, 92.0),
            bottom_right: crate::coord::GeoPoint::new(1.0, 91.0),
            provider: crate::provider::ProviderConfig::Osm,
            ..Default::default()
        };

        let mut orchestrator = MosaicOrchestrator::new(config, client);
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, MosaicError::InvalidBoundingBox { .. }));
        assert_eq!(orchestrator.state(), MosaicState::Failed);
    }

    #[test]
    fn test_output_path_embeds_corners_as_supplied() {
        let client = Arc::new(MockAsyncHttpClient {
            response: Ok(vec![]),
        });
        let config = MosaicConfig::default();
        let bbox = config.bounding_box();
        let orchestrator = MosaicOrchestrator::new(config, client);

        let path = orchestrator.output_path(18, &bbox);
        assert_eq!(
            path,
            PathBuf::from("./18-116.385313,39.921463,116.39628,39.91186.tif")
        );
    }
}
