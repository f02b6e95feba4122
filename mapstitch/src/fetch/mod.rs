//! Bounded-concurrency tile fetching.
//!
//! Spawns one task per tile in the rectangle, capped by a
//! [`FetchLimiter`] permit pool, and hands each decoded tile to a
//! caller-supplied sink function as it completes. Completion order is
//! unspecified; results are keyed by tile index so downstream consumption
//! is order-independent.
//!
//! # Failure model
//!
//! Fail fast, no retries: the first fetch, decode, cache or sink error
//! cancels the run. In-flight workers are aborted via a
//! `CancellationToken`, already-fetched tiles are discarded, and the
//! first error is returned with the tile index and URL that produced it.
//! No partial mosaic is ever produced.

mod cache;
mod limiter;

pub use cache::TileCache;
pub use limiter::{FetchLimiter, FetchPermit};

use crate::coord::{TileIndex, TileRect};
use crate::error::MosaicError;
use crate::mosaic::TileImage;
use crate::progress::ProgressTracker;
use crate::provider::{AsyncHttpClient, Provider};
use crate::resolver;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Fetch phase configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    concurrency: usize,
}

impl FetchConfig {
    pub fn new(concurrency: usize) -> Self {
        Self { concurrency }
    }

    /// Maximum concurrent fetches, never below 1.
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Fetches every tile in `rect`, passing each decoded tile to `on_tile`
/// as it arrives.
///
/// `on_tile` runs on worker tasks and must synchronize any shared state
/// it touches. An error from it aborts the run like a fetch failure.
/// When `cache` is present, raw tile bytes are persisted before decoding.
pub async fn fetch_each<C, F>(
    client: Arc<C>,
    provider: Arc<dyn Provider>,
    rect: TileRect,
    config: FetchConfig,
    cache: Option<Arc<TileCache>>,
    progress: Arc<ProgressTracker>,
    on_tile: F,
) -> Result<(), MosaicError>
where
    C: AsyncHttpClient + 'static,
    F: Fn(TileIndex, TileImage) -> Result<(), MosaicError> + Send + Sync + 'static,
{
    let limiter = Arc::new(FetchLimiter::new(config.concurrency()));
    let token = CancellationToken::new();
    let on_tile = Arc::new(on_tile);
    let mut workers = JoinSet::new();

    debug!(
        tiles = rect.len(),
        concurrency = limiter.max_concurrent(),
        provider = provider.name(),
        "starting tile fetch"
    );

    for index in rect.tiles() {
        let client = Arc::clone(&client);
        let provider = Arc::clone(&provider);
        let cache = cache.clone();
        let limiter = Arc::clone(&limiter);
        let token = token.clone();
        let progress = Arc::clone(&progress);
        let on_tile = Arc::clone(&on_tile);

        workers.spawn(async move {
            fetch_tile(
                index, client, provider, cache, limiter, token, progress, on_tile,
            )
            .await
        });
    }

    // Fail fast: the first error cancels and aborts everything in flight.
    let mut first_error = None;
    while let Some(joined) = workers.join_next().await {
        let result = match joined {
            Ok(result) => result,
            Err(join_err) if join_err.is_cancelled() => continue,
            Err(join_err) => Err(MosaicError::Internal(format!(
                "fetch worker panicked: {}",
                join_err
            ))),
        };

        if let Err(err) = result {
            if first_error.is_none() {
                warn!(error = %err, "tile fetch failed, aborting remaining downloads");
                token.cancel();
                workers.abort_all();
                first_error = Some(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => {
            debug!(tiles = rect.len(), "tile fetch complete");
            Ok(())
        }
    }
}

/// Fetches every tile in `rect` and returns the decoded tiles keyed by
/// index. Batch-discipline entry point.
pub async fn fetch_all<C>(
    client: Arc<C>,
    provider: Arc<dyn Provider>,
    rect: TileRect,
    config: FetchConfig,
    cache: Option<Arc<TileCache>>,
    progress: Arc<ProgressTracker>,
) -> Result<HashMap<TileIndex, TileImage>, MosaicError>
where
    C: AsyncHttpClient + 'static,
{
    let tiles = Arc::new(Mutex::new(HashMap::with_capacity(rect.len())));
    let collector = Arc::clone(&tiles);

    fetch_each(
        client,
        provider,
        rect,
        config,
        cache,
        progress,
        move |index, tile| {
            collector
                .lock()
                .map_err(|_| MosaicError::Internal("fetch collector lock poisoned".to_string()))?
                .insert(index, tile);
            Ok(())
        },
    )
    .await?;

    let tiles = Arc::try_unwrap(tiles)
        .map_err(|_| MosaicError::Internal("fetch results still shared".to_string()))?;
    tiles
        .into_inner()
        .map_err(|_| MosaicError::Internal("fetch collector lock poisoned".to_string()))
}

#[allow(clippy::too_many_arguments)]
async fn fetch_tile<C, F>(
    index: TileIndex,
    client: Arc<C>,
    provider: Arc<dyn Provider>,
    cache: Option<Arc<TileCache>>,
    limiter: Arc<FetchLimiter>,
    token: CancellationToken,
    progress: Arc<ProgressTracker>,
    on_tile: Arc<F>,
) -> Result<(), MosaicError>
where
    C: AsyncHttpClient + 'static,
    F: Fn(TileIndex, TileImage) -> Result<(), MosaicError> + Send + Sync + 'static,
{
    // A worker woken after cancellation has nothing useful left to do.
    let _permit = tokio::select! {
        biased;
        _ = token.cancelled() => return Ok(()),
        permit = limiter.acquire() => permit,
    };

    let url = resolver::build_url(provider.url_template(), index.x, index.y, index.zoom);

    let bytes = tokio::select! {
        biased;
        _ = token.cancelled() => return Ok(()),
        result = client.get(&url) => result.map_err(|source| MosaicError::TileFetch {
            x: index.x,
            y: index.y,
            zoom: index.zoom,
            url: url.clone(),
            source,
        })?,
    };

    drop(_permit);

    if let Some(cache) = &cache {
        cache.store(index, &bytes).await?;
    }

    let tile = TileImage::decode(&bytes).map_err(|source| MosaicError::TileDecode {
        x: index.x,
        y: index.y,
        zoom: index.zoom,
        source,
    })?;

    progress.tick();
    debug!(tile = %index, bytes = bytes.len(), "tile fetched");

    on_tile(index, tile)
}
