//! CLI command implementations.

pub mod cache;
pub mod common;
pub mod prewarm;
pub mod providers;
pub mod serve;
pub mod tile;
