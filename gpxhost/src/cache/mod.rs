//! Flat-file tile cache.
//!
//! Tiles live at `<cache_root>/tiles/<provider>/<z>/<x>/<y>.<ext>`. Entries
//! are written once and never expire.

mod key;
mod stats;
mod usage;

pub use key::{TileKey, TileKeyError, TILES_DIR};
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use usage::{disk_usage, format_size};
