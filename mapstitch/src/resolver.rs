//! Tile address resolution.
//!
//! Turns a geographic bounding box plus zoom level into the inclusive
//! tile-index rectangle covering it, and builds per-tile request URLs
//! from a provider's template.

use crate::coord::{self, BoundingBox, CoordError, TileRect};
use crate::error::MosaicError;
use crate::provider::Provider;

/// Resolves a bounding box to the tile rectangle covering it at `zoom`.
///
/// Both corners are mapped into the provider's coordinate space first.
/// Min/max is taken per axis, so corners supplied in any order resolve to
/// the same rectangle. Fails when either corner produces a non-finite
/// tile coordinate (latitude outside the Mercator range).
pub fn resolve(
    bbox: &BoundingBox,
    zoom: u8,
    provider: &dyn Provider,
) -> Result<TileRect, MosaicError> {
    let a = provider.to_provider_space(bbox.top_left);
    let b = provider.to_provider_space(bbox.bottom_right);

    let (ax, ay) = coord::tile_index(a.lng, a.lat, zoom).map_err(invalid_box)?;
    let (bx, by) = coord::tile_index(b.lng, b.lat, zoom).map_err(invalid_box)?;

    Ok(TileRect {
        x_min: ax.min(bx),
        x_max: ax.max(bx),
        y_min: ay.min(by),
        y_max: ay.max(by),
        zoom,
    })
}

fn invalid_box(err: CoordError) -> MosaicError {
    match err {
        CoordError::NonFiniteTile { lng, lat } => MosaicError::InvalidBoundingBox { lng, lat },
    }
}

/// Builds a tile request URL by substituting `{x}`, `{y}` and `{z}`.
///
/// Every occurrence of each placeholder is replaced; the placeholders are
/// disjoint strings, so replacement order does not matter.
pub fn build_url(template: &str, x: i32, y: i32, zoom: u8) -> String {
    template
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
        .replace("{z}", &zoom.to_string())
}
