//! Cache keys and on-disk tile paths.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::coord::{tiles_per_axis, MAX_ZOOM};

/// Directory under the cache root that holds tile files.
pub const TILES_DIR: &str = "tiles";

/// Longest accepted file extension.
const MAX_EXTENSION_LEN: usize = 8;

/// Reasons a tile request cannot be turned into a [`TileKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileKeyError {
    #[error("invalid zoom level '{0}'")]
    Zoom(String),

    #[error("invalid tile column '{0}'")]
    Column(String),

    #[error("invalid tile row '{0}', expected <row>.<extension>")]
    Row(String),

    #[error("invalid file extension '{0}'")]
    Extension(String),

    #[error("tile {x}/{y} is outside the {size}x{size} grid at zoom {zoom}")]
    OutOfRange { zoom: u8, x: u32, y: u32, size: u32 },
}

/// Identifies one cached raster tile.
///
/// `y` is the row exactly as requested; for TMS providers that is already
/// the flipped row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub provider: String,
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
    pub extension: String,
}

impl TileKey {
    pub fn new(
        provider: impl Into<String>,
        zoom: u8,
        x: u32,
        y: u32,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            zoom,
            x,
            y,
            extension: extension.into(),
        }
    }

    /// Parses raw request segments (`z`, `x`, `y.ext`) into a key.
    ///
    /// Only plain decimal numbers and an alphanumeric extension are accepted,
    /// so the resulting path can never leave the provider's directory.
    pub fn parse(
        provider: &str,
        zoom: &str,
        x: &str,
        y_with_extension: &str,
    ) -> Result<Self, TileKeyError> {
        let zoom_value = parse_decimal(zoom)
            .and_then(|z| u8::try_from(z).ok())
            .filter(|z| *z <= MAX_ZOOM)
            .ok_or_else(|| TileKeyError::Zoom(zoom.to_string()))?;

        let x_value = parse_decimal(x).ok_or_else(|| TileKeyError::Column(x.to_string()))?;

        let (row, extension) = y_with_extension
            .rsplit_once('.')
            .ok_or_else(|| TileKeyError::Row(y_with_extension.to_string()))?;
        let y_value =
            parse_decimal(row).ok_or_else(|| TileKeyError::Row(y_with_extension.to_string()))?;

        if extension.is_empty()
            || extension.len() > MAX_EXTENSION_LEN
            || !extension.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(TileKeyError::Extension(extension.to_string()));
        }

        let size = tiles_per_axis(zoom_value);
        if x_value >= size || y_value >= size {
            return Err(TileKeyError::OutOfRange {
                zoom: zoom_value,
                x: x_value,
                y: y_value,
                size,
            });
        }

        Ok(Self::new(provider, zoom_value, x_value, y_value, extension))
    }

    /// File name of the tile inside its column directory.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.y, self.extension)
    }

    /// Location of this tile below `cache_root`.
    ///
    /// Layout: `<cache_root>/tiles/<provider>/<z>/<x>/<y>.<ext>`
    pub fn path_in(&self, cache_root: &Path) -> PathBuf {
        cache_root
            .join(TILES_DIR)
            .join(&self.provider)
            .join(self.zoom.to_string())
            .join(self.x.to_string())
            .join(self.file_name())
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}.{}",
            self.provider, self.zoom, self.x, self.y, self.extension
        )
    }
}

/// Parses a canonical unsigned decimal: ASCII digits only, no sign, no
/// spaces and no leading zeros, so the cache path spells the number exactly
/// as it was requested.
fn parse_decimal(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}
