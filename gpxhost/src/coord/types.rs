//! Coordinate type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Web Mercator valid latitude range
pub const MERCATOR_MAX_LAT: f64 = 85.05112878;
pub const MIN_LAT: f64 = -MERCATOR_MAX_LAT;
pub const MAX_LAT: f64 = MERCATOR_MAX_LAT;

/// Valid longitude range, half-open: `[MIN_LON, MAX_LON)`
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Highest zoom level whose tile indices fit in a `u32`.
pub const MAX_ZOOM: u8 = 30;

/// Longitude spans at least this close to 360° count as whole-world coverage.
pub const WHOLE_WORLD_EPSILON: f64 = 1e-9;

/// Number of tiles along one axis at `zoom` (`2^zoom`).
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom.min(MAX_ZOOM)
}

/// Tile coordinates in the Web Mercator / slippy-map system.
///
/// Rows increase southward, columns increase eastward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level
    pub zoom: u8,
    /// X coordinate (east-west), 0 at the antimeridian
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
}

impl TileCoord {
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Inclusive range of tile columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XSegment {
    pub min: u32,
    pub max: u32,
}

impl XSegment {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Number of columns covered.
    #[inline]
    pub fn width(&self) -> u64 {
        u64::from(self.max) - u64::from(self.min) + 1
    }

    /// Iterates the columns in ascending order.
    pub fn columns(&self) -> std::ops::RangeInclusive<u32> {
        self.min..=self.max
    }
}

/// Inclusive range of tile rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub min: u32,
    pub max: u32,
}

impl RowRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Number of rows covered.
    #[inline]
    pub fn height(&self) -> u64 {
        u64::from(self.max) - u64::from(self.min) + 1
    }

    /// Iterates the rows from north to south.
    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.min..=self.max
    }
}

/// Geographic bounding box in degrees.
///
/// `west` may be numerically greater than `east` when the box crosses the
/// antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// True when every edge is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.north, self.south, self.east, self.west]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Returns the bounds with `north >= south`, swapping the two if inverted.
    pub fn normalized(&self) -> Self {
        if self.south > self.north {
            Self {
                north: self.south,
                south: self.north,
                ..*self
            }
        } else {
            *self
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N{:.5} S{:.5} E{:.5} W{:.5}",
            self.north, self.south, self.east, self.west
        )
    }
}
