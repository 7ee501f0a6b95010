//! Prewarm planning: zoom range resolution and tile enumeration.

use crate::coord::{x_segments_for_bounds, y_range_for_bounds, Bounds, TileCoord};
use crate::provider::ProviderConfig;
use crate::tile::TileError;

/// Largest accepted distance between the center zoom and either end of the
/// prewarmed zoom range.
pub const MAX_ZOOM_RADIUS: i64 = 6;

/// Upper bound on the number of tiles a single prewarm may request.
pub const MAX_TILES_PER_PREWARM: u64 = 50_000;

/// Resolves the inclusive zoom range to prewarm for `provider`.
///
/// The radius is clamped to `[0, MAX_ZOOM_RADIUS]` and both ends of the
/// range to the provider's supported zooms.
pub fn resolve_zoom_range(provider: &ProviderConfig, center_zoom: i64, zoom_radius: i64) -> (u8, u8) {
    let radius = zoom_radius.clamp(0, MAX_ZOOM_RADIUS);
    let center = i64::from(provider.clamp_zoom(center_zoom));
    (
        provider.clamp_zoom(center - radius),
        provider.clamp_zoom(center + radius),
    )
}

/// The set of tiles one prewarm will request.
#[derive(Debug, Clone, PartialEq)]
pub struct PrewarmPlan {
    pub zoom_min: u8,
    pub zoom_max: u8,
    /// Request bounds with north and south in order
    pub bounds: Bounds,
    pub total: u64,
}

impl PrewarmPlan {
    /// Plans a prewarm, refusing it once the running tile count exceeds
    /// `max_tiles`.
    ///
    /// The count is accumulated zoom by zoom and segment by segment so an
    /// oversized request is rejected without enumerating its tiles.
    pub fn build(
        provider: &ProviderConfig,
        bounds: &Bounds,
        center_zoom: i64,
        zoom_radius: i64,
        max_tiles: u64,
    ) -> Result<Self, TileError> {
        if !bounds.is_finite() {
            return Err(TileError::InvalidBounds(*bounds));
        }
        let (zoom_min, zoom_max) = resolve_zoom_range(provider, center_zoom, zoom_radius);
        let bounds = bounds.normalized();

        let mut total = 0u64;
        for zoom in zoom_min..=zoom_max {
            let rows = y_range_for_bounds(bounds.north, bounds.south, zoom).height();
            for segment in x_segments_for_bounds(bounds.west, bounds.east, zoom) {
                total += segment.width() * rows;
                if total > max_tiles {
                    return Err(TileError::TooManyTiles {
                        total,
                        max: max_tiles,
                    });
                }
            }
        }

        Ok(Self {
            zoom_min,
            zoom_max,
            bounds,
            total,
        })
    }

    /// Enumerates tiles in zoom → segment → column → row order.
    ///
    /// Rows are in the XYZ convention (row 0 at the north edge).
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> {
        let bounds = self.bounds;
        (self.zoom_min..=self.zoom_max).flat_map(move |zoom| {
            let rows = y_range_for_bounds(bounds.north, bounds.south, zoom);
            x_segments_for_bounds(bounds.west, bounds.east, zoom)
                .into_iter()
                .flat_map(move |segment| {
                    segment
                        .columns()
                        .flat_map(move |x| rows.rows().map(move |y| TileCoord::new(zoom, x, y)))
                })
        })
    }
}
