//! Tile compositing.
//!
//! Writes each decoded tile's pixel bands into its sub-rectangle of the
//! shared output raster. Tiles map to disjoint pixel regions by
//! construction, so correctness only requires that the raster handle
//! itself is never touched by two writers at once. Two disciplines
//! satisfy that:
//!
//! - **Batch** ([`composite`]): all tiles are fetched first, then written
//!   one at a time on a single thread. No synchronization needed; this is
//!   the default.
//! - **Streaming** ([`StreamingCompositor`]): each tile is written as it
//!   arrives from a fetch worker, under one global lock around the sink.
//!   Trades lock contention for not holding every decoded tile in memory
//!   at once.
//!
//! Both disciplines produce byte-identical output.

mod sink;

pub use sink::{MosaicImage, RasterSink, SinkError, BAND_COUNT};

use crate::coord::{TileIndex, TileRect, TILE_SIZE};
use crate::error::MosaicError;
use crate::progress::ProgressTracker;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Which compositing discipline the orchestrator uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeMode {
    /// Fetch everything, then write sequentially.
    #[default]
    Batch,
    /// Write each tile as it arrives, serialized through a global lock.
    Streaming,
}

/// One fetched tile decoded into three 8-bit bands (R, G, B).
///
/// Created by the fetcher, consumed exactly once by the compositor.
/// Carries its true dimensions so undersized or oversized tiles from a
/// misbehaving server are rejected instead of corrupting neighbours.
#[derive(Debug, Clone)]
pub struct TileImage {
    width: u32,
    height: u32,
    bands: [Vec<u8>; 3],
}

impl TileImage {
    /// Decodes fetched bytes (any format the `image` crate recognizes)
    /// into planar RGB bands.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let decoded = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?
            .decode()?
            .to_rgb8();

        Ok(Self::from_rgb(&decoded))
    }

    /// Splits an interleaved RGB image into planar bands.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let samples = (width as usize) * (height as usize);
        let mut bands = [
            Vec::with_capacity(samples),
            Vec::with_capacity(samples),
            Vec::with_capacity(samples),
        ];

        for pixel in image.pixels() {
            bands[0].push(pixel.0[0]);
            bands[1].push(pixel.0[1]);
            bands[2].push(pixel.0[2]);
        }

        Self {
            width,
            height,
            bands,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major samples of one band.
    pub fn band(&self, band: usize) -> &[u8] {
        &self.bands[band]
    }
}

/// Writes one tile's bands into its destination sub-rectangle.
fn blit<S: RasterSink>(
    tile: &TileImage,
    index: TileIndex,
    rect: &TileRect,
    sink: &mut S,
) -> Result<(), MosaicError> {
    if tile.width() != TILE_SIZE || tile.height() != TILE_SIZE {
        return Err(MosaicError::BandSizeMismatch {
            x: index.x,
            y: index.y,
            width: tile.width(),
            height: tile.height(),
        });
    }

    let x_off = (index.x - rect.x_min) as u32 * TILE_SIZE;
    let y_off = (index.y - rect.y_min) as u32 * TILE_SIZE;

    for band in 0..BAND_COUNT {
        sink.write_block(band, x_off, y_off, TILE_SIZE, TILE_SIZE, tile.band(band))?;
    }

    Ok(())
}

/// Batch discipline: writes all fetched tiles sequentially.
///
/// Tiles are written in row-major rectangle order. Every index in `rect`
/// must be present in `tiles`; the fetcher guarantees this on success.
pub fn composite<S: RasterSink>(
    tiles: &HashMap<TileIndex, TileImage>,
    rect: &TileRect,
    sink: &mut S,
    progress: &ProgressTracker,
) -> Result<(), MosaicError> {
    for index in rect.tiles() {
        let tile = tiles.get(&index).ok_or_else(|| {
            MosaicError::Internal(format!("tile {} missing from fetch results", index))
        })?;

        blit(tile, index, rect, sink)?;
        progress.tick();
    }

    Ok(())
}

/// Streaming discipline: accepts tiles from concurrent fetch workers and
/// writes each under a global sink lock.
///
/// Write regions are pixel-disjoint, so the lock exists only because the
/// raster handle is not safe for concurrent access. The contention buys
/// bounded memory: tiles are dropped as soon as they are written.
pub struct StreamingCompositor<S: RasterSink> {
    sink: Mutex<S>,
    rect: TileRect,
    progress: Arc<ProgressTracker>,
}

impl<S: RasterSink> StreamingCompositor<S> {
    pub fn new(sink: S, rect: TileRect, progress: Arc<ProgressTracker>) -> Self {
        Self {
            sink: Mutex::new(sink),
            rect,
            progress,
        }
    }

    /// Writes one tile into the shared raster.
    ///
    /// Safe to call from any number of workers; writes are serialized.
    pub fn write_tile(&self, index: TileIndex, tile: &TileImage) -> Result<(), MosaicError> {
        {
            let mut sink = self
                .sink
                .lock()
                .map_err(|_| MosaicError::Internal("raster sink lock poisoned".to_string()))?;
            blit(tile, index, &self.rect, &mut *sink)?;
        }

        self.progress.tick();
        Ok(())
    }

    /// Consumes the compositor and returns the sink.
    pub fn into_sink(self) -> S {
        self.sink
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Phase;
    use image::Rgb;

    fn solid_tile(r: u8, g: u8, b: u8) -> TileImage {
        TileImage::from_rgb(&RgbImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgb([r, g, b])))
    }

    fn rect_2x2() -> TileRect {
        TileRect {
            x_min: 0,
            x_max: 1,
            y_min: 0,
            y_max: 1,
            zoom: 1,
        }
    }

    fn quadrant_tiles() -> HashMap<TileIndex, TileImage> {
        let mut tiles = HashMap::new();
        tiles.insert(TileIndex { x: 0, y: 0, zoom: 1 }, solid_tile(255, 0, 0));
        tiles.insert(TileIndex { x: 1, y: 0, zoom: 1 }, solid_tile(0, 255, 0));
        tiles.insert(TileIndex { x: 0, y: 1, zoom: 1 }, solid_tile(0, 0, 255));
        tiles.insert(
            TileIndex { x: 1, y: 1, zoom: 1 },
            solid_tile(255, 255, 255),
        );
        tiles
    }

    fn tracker(total: usize) -> ProgressTracker {
        ProgressTracker::new(Phase::Compositing, total, None)
    }

    #[test]
    fn test_quadrants_have_exact_colors_with_no_seam_bleed() {
        let rect = rect_2x2();
        let mut sink = MosaicImage::create(rect.pixel_width(), rect.pixel_height());
        let progress = tracker(4);

        composite(&quadrant_tiles(), &rect, &mut sink, &progress).unwrap();
        assert_eq!(progress.completed(), 4);

        let img = sink.into_rgb();
        assert_eq!(img.dimensions(), (512, 512));

        // Quadrant interiors
        assert_eq!(img.get_pixel(10, 10).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(300, 10).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(10, 300).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(300, 300).0, [255, 255, 255]);

        // Both sides of every seam stay solid
        assert_eq!(img.get_pixel(255, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(256, 0).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(0, 255).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(0, 256).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(255, 255).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(256, 256).0, [255, 255, 255]);
    }

    #[test]
    fn test_rect_offset_is_applied() {
        // A rectangle that does not start at the grid origin writes its
        // first tile at pixel (0, 0) regardless.
        let rect = TileRect {
            x_min: 7,
            x_max: 7,
            y_min: 11,
            y_max: 11,
            zoom: 5,
        };
        let mut tiles = HashMap::new();
        tiles.insert(TileIndex { x: 7, y: 11, zoom: 5 }, solid_tile(9, 8, 7));

        let mut sink = MosaicImage::create(256, 256);
        composite(&tiles, &rect, &mut sink, &tracker(1)).unwrap();

        assert_eq!(sink.into_rgb().get_pixel(0, 0).0, [9, 8, 7]);
    }

    #[test]
    fn test_undersized_tile_is_rejected() {
        let rect = rect_2x2();
        let mut tiles = quadrant_tiles();
        tiles.insert(
            TileIndex { x: 1, y: 1, zoom: 1 },
            TileImage::from_rgb(&RgbImage::from_pixel(128, 128, Rgb([1, 2, 3]))),
        );

        let mut sink = MosaicImage::create(rect.pixel_width(), rect.pixel_height());
        let err = composite(&tiles, &rect, &mut sink, &tracker(4)).unwrap_err();

        assert!(matches!(
            err,
            MosaicError::BandSizeMismatch {
                x: 1,
                y: 1,
                width: 128,
                height: 128
            }
        ));
    }

    #[test]
    fn test_missing_tile_is_an_internal_error() {
        let rect = rect_2x2();
        let mut tiles = quadrant_tiles();
        tiles.remove(&TileIndex { x: 0, y: 1, zoom: 1 });

        let mut sink = MosaicImage::create(rect.pixel_width(), rect.pixel_height());
        let err = composite(&tiles, &rect, &mut sink, &tracker(4)).unwrap_err();
        assert!(matches!(err, MosaicError::Internal(_)));
    }

    #[test]
    fn test_streaming_matches_batch_byte_for_byte() {
        let rect = rect_2x2();
        let tiles = quadrant_tiles();

        let mut batch_sink = MosaicImage::create(rect.pixel_width(), rect.pixel_height());
        composite(&tiles, &rect, &mut batch_sink, &tracker(4)).unwrap();

        let streaming = Arc::new(StreamingCompositor::new(
            MosaicImage::create(rect.pixel_width(), rect.pixel_height()),
            rect,
            Arc::new(tracker(4)),
        ));

        // Emulate fetch workers delivering tiles concurrently
        let mut handles = Vec::new();
        for (index, tile) in tiles {
            let streaming = Arc::clone(&streaming);
            handles.push(std::thread::spawn(move || {
                streaming.write_tile(index, &tile).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let streaming_sink = Arc::try_unwrap(streaming)
            .unwrap_or_else(|_| panic!("workers still hold the compositor"))
            .into_sink();

        assert_eq!(batch_sink.as_raw(), streaming_sink.as_raw());
    }

    #[test]
    fn test_decode_solid_png_round_trip() {
        let source = RgbImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgb([12, 34, 56]));
        let mut encoded = Cursor::new(Vec::new());
        source
            .write_to(&mut encoded, image::ImageFormat::Png)
            .unwrap();

        let tile = TileImage::decode(encoded.get_ref()).unwrap();
        assert_eq!(tile.width(), TILE_SIZE);
        assert_eq!(tile.height(), TILE_SIZE);
        assert!(tile.band(0).iter().all(|&s| s == 12));
        assert!(tile.band(1).iter().all(|&s| s == 34));
        assert!(tile.band(2).iter().all(|&s| s == 56));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = TileImage::decode(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(result.is_err());
    }
}
