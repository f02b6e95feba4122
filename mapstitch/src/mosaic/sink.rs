//! Output raster sink.
//!
//! The engine writes the mosaic through the [`RasterSink`] trait so the
//! concrete file format stays swappable. [`MosaicImage`] is the bundled
//! implementation: an in-memory 3-band RGB raster persisted with the
//! `image` crate (format chosen by file extension on save).

use image::RgbImage;
use std::path::Path;
use thiserror::Error;

/// Number of sample bands in the output raster (R, G, B).
pub const BAND_COUNT: usize = 3;

/// Errors produced by a raster sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Band index outside the raster's band count
    #[error("band {band} out of range (raster has {BAND_COUNT} bands)")]
    BandOutOfRange { band: usize },

    /// Block rectangle does not fit inside the raster
    #[error(
        "block {width}x{height} at ({x_off}, {y_off}) exceeds raster bounds {raster_width}x{raster_height}"
    )]
    BlockOutOfBounds {
        x_off: u32,
        y_off: u32,
        width: u32,
        height: u32,
        raster_width: u32,
        raster_height: u32,
    },

    /// Sample buffer length does not match the block dimensions
    #[error("block data length {got} does not match {width}x{height}")]
    BadBlockLength { got: usize, width: u32, height: u32 },

    /// Writing the raster file failed
    #[error("failed to write raster file: {0}")]
    Io(#[from] image::ImageError),
}

/// Write access to a multi-band output raster.
///
/// One band is written at a time as a rectangular block of 8-bit samples
/// in row-major order. Implementations are not required to tolerate
/// concurrent writers; callers serialize access.
pub trait RasterSink: Send {
    /// Raster width in pixels.
    fn width(&self) -> u32;

    /// Raster height in pixels.
    fn height(&self) -> u32;

    /// Number of sample bands.
    fn band_count(&self) -> usize;

    /// Writes one band's samples into the given sub-rectangle.
    fn write_block(
        &mut self,
        band: usize,
        x_off: u32,
        y_off: u32,
        width: u32,
        height: u32,
        samples: &[u8],
    ) -> Result<(), SinkError>;

    /// Flushes any buffered state.
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// In-memory RGB raster sink backed by the `image` crate.
pub struct MosaicImage {
    image: RgbImage,
}

impl MosaicImage {
    /// Creates a raster of the given pixel dimensions, initially black.
    pub fn create(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
        }
    }

    /// Writes the raster to `path`; the format follows the extension.
    pub fn save(&self, path: &Path) -> Result<(), SinkError> {
        self.image.save(path)?;
        Ok(())
    }

    /// Raw interleaved RGB samples, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Consumes the sink and returns the underlying image.
    pub fn into_rgb(self) -> RgbImage {
        self.image
    }
}

impl RasterSink for MosaicImage {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn band_count(&self) -> usize {
        BAND_COUNT
    }

    fn write_block(
        &mut self,
        band: usize,
        x_off: u32,
        y_off: u32,
        width: u32,
        height: u32,
        samples: &[u8],
    ) -> Result<(), SinkError> {
        if band >= BAND_COUNT {
            return Err(SinkError::BandOutOfRange { band });
        }
        if x_off + width > self.image.width() || y_off + height > self.image.height() {
            return Err(SinkError::BlockOutOfBounds {
                x_off,
                y_off,
                width,
                height,
                raster_width: self.image.width(),
                raster_height: self.image.height(),
            });
        }
        if samples.len() != (width as usize) * (height as usize) {
            return Err(SinkError::BadBlockLength {
                got: samples.len(),
                width,
                height,
            });
        }

        for row in 0..height {
            for col in 0..width {
                let sample = samples[(row * width + col) as usize];
                let pixel = self.image.get_pixel_mut(x_off + col, y_off + row);
                pixel.0[band] = sample;
            }
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_block_lands_in_the_right_band() {
        let mut sink = MosaicImage::create(4, 4);
        let block = vec![200u8; 4];

        sink.write_block(1, 2, 2, 2, 2, &block).unwrap();

        let img = sink.into_rgb();
        assert_eq!(img.get_pixel(2, 2).0, [0, 200, 0]);
        assert_eq!(img.get_pixel(3, 3).0, [0, 200, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_band_out_of_range_is_rejected() {
        let mut sink = MosaicImage::create(4, 4);
        let err = sink.write_block(3, 0, 0, 1, 1, &[0]).unwrap_err();
        assert!(matches!(err, SinkError::BandOutOfRange { band: 3 }));
    }

    #[test]
    fn test_out_of_bounds_block_is_rejected() {
        let mut sink = MosaicImage::create(4, 4);
        let err = sink.write_block(0, 3, 0, 2, 1, &[0, 0]).unwrap_err();
        assert!(matches!(err, SinkError::BlockOutOfBounds { .. }));
    }

    #[test]
    fn test_short_sample_buffer_is_rejected() {
        let mut sink = MosaicImage::create(4, 4);
        let err = sink.write_block(0, 0, 0, 2, 2, &[0, 0]).unwrap_err();
        assert!(matches!(err, SinkError::BadBlockLength { got: 2, .. }));
    }
}
