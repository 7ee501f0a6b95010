//! Coordinate conversion module
//!
//! Converts geographic coordinates (latitude/longitude) into Web Mercator
//! tile indices and bounding boxes into the tile ranges that cover them.
//!
//! Two edge policies matter here:
//!
//! - **Poles**: latitude is clamped to ±85.05112878° before projecting, since
//!   the Mercator Y formula diverges at ±90°.
//! - **Antimeridian**: a box whose normalized west edge lies east of its
//!   normalized east edge wraps across ±180° and is split into two column
//!   segments.
//!
//! Everything in this module is pure and safe to call from any thread.

mod types;

pub use types::{
    tiles_per_axis, Bounds, RowRange, TileCoord, XSegment, MAX_LAT, MAX_LON, MAX_ZOOM,
    MERCATOR_MAX_LAT, MIN_LAT, MIN_LON, WHOLE_WORLD_EPSILON,
};

use std::f64::consts::PI;

/// Clamps latitude into the Web Mercator valid range.
#[inline]
pub fn clamp_lat(lat: f64) -> f64 {
    lat.clamp(MIN_LAT, MAX_LAT)
}

/// Reduces longitude into `[-180, 180)`.
///
/// Non-finite input yields NaN.
#[inline]
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon - MIN_LON).rem_euclid(360.0) + MIN_LON;
    // rem_euclid may round up to exactly 360 for tiny negative offsets
    if wrapped >= MAX_LON {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Floors a fractional tile index and clamps it into `[0, n - 1]`.
#[inline]
fn clamp_index(value: f64, n: u32) -> u32 {
    let floored = value.floor();
    if floored.is_nan() || floored <= 0.0 {
        0
    } else if floored >= f64::from(n) {
        n - 1
    } else {
        floored as u32
    }
}

/// Converts longitude in degrees to a tile column at `zoom`.
///
/// Longitude is used as given; normalize with [`normalize_lon`] first if it
/// may lie outside `[-180, 180)`. The result is clamped into
/// `[0, 2^zoom - 1]`.
#[inline]
pub fn lon_to_tile_x(lon: f64, zoom: u8) -> u32 {
    let n = tiles_per_axis(zoom);
    clamp_index((lon - MIN_LON) / 360.0 * f64::from(n), n)
}

/// Converts latitude in degrees to a tile row at `zoom`.
///
/// Latitude is clamped to the Web Mercator range before projecting. The
/// result is clamped into `[0, 2^zoom - 1]`.
#[inline]
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> u32 {
    let n = tiles_per_axis(zoom);
    let lat_rad = clamp_lat(lat).to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * f64::from(n);
    clamp_index(y, n)
}

/// Mirrors a row between the XYZ (north origin) and TMS (south origin)
/// conventions.
#[inline]
pub fn flip_row(y: u32, zoom: u8) -> u32 {
    (tiles_per_axis(zoom) - 1).saturating_sub(y)
}

/// Returns the column segments covering `west..east` at `zoom`.
///
/// One segment for an ordinary span, two when the span crosses the
/// antimeridian, and the full row of columns when the span is (nearly) the
/// whole world.
pub fn x_segments_for_bounds(west: f64, east: f64, zoom: u8) -> Vec<XSegment> {
    let n = tiles_per_axis(zoom);

    if (east - west).abs() >= 360.0 - WHOLE_WORLD_EPSILON {
        return vec![XSegment::new(0, n - 1)];
    }

    let west_norm = normalize_lon(west);
    let east_norm = normalize_lon(east);

    let x_west = lon_to_tile_x(west_norm, zoom);
    let x_east = lon_to_tile_x(east_norm, zoom);

    if west_norm <= east_norm {
        return vec![XSegment::new(x_west.min(x_east), x_west.max(x_east))];
    }

    vec![XSegment::new(x_west, n - 1), XSegment::new(0, x_east)]
}

/// Returns the ascending row range covering `north..south` at `zoom`.
pub fn y_range_for_bounds(north: f64, south: f64, zoom: u8) -> RowRange {
    let north_y = lat_to_tile_y(north, zoom);
    let south_y = lat_to_tile_y(south, zoom);
    RowRange::new(north_y.min(south_y), north_y.max(south_y))
}

/// Number of tiles covering `bounds` at a single zoom level.
pub fn tile_count_for_bounds(bounds: &Bounds, zoom: u8) -> u64 {
    let rows = y_range_for_bounds(bounds.north, bounds.south, zoom).height();
    x_segments_for_bounds(bounds.west, bounds.east, zoom)
        .iter()
        .map(|segment| segment.width() * rows)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_lat() {
        assert_eq!(clamp_lat(90.0), MERCATOR_MAX_LAT);
        assert_eq!(clamp_lat(-90.0), -MERCATOR_MAX_LAT);
        assert_eq!(clamp_lat(0.0), 0.0);
        assert_eq!(clamp_lat(45.0), 45.0);
    }

    #[test]
    fn test_normalize_lon() {
        let cases = [
            (180.0, -180.0),
            (-180.0, -180.0),
            (0.0, 0.0),
            (190.0, -170.0),
            (-190.0, 170.0),
            (360.0, 0.0),
            (-360.0, 0.0),
            (540.0, -180.0),
            (179.5, 179.5),
        ];
        for (lon, expected) in cases {
            assert_eq!(normalize_lon(lon), expected, "normalize_lon({})", lon);
        }
    }

    #[test]
    fn test_normalize_lon_non_finite() {
        assert!(normalize_lon(f64::INFINITY).is_nan());
        assert!(normalize_lon(f64::NAN).is_nan());
    }

    #[test]
    fn test_lon_to_tile_x_low_zooms() {
        // Zoom 0: a single tile covers the world
        assert_eq!(lon_to_tile_x(0.0, 0), 0);
        // Zoom 1: two columns split at the prime meridian
        assert_eq!(lon_to_tile_x(-180.0, 1), 0);
        assert_eq!(lon_to_tile_x(-0.0001, 1), 0);
        assert_eq!(lon_to_tile_x(0.0, 1), 1);
        assert_eq!(lon_to_tile_x(179.9999, 1), 1);
    }

    #[test]
    fn test_lon_to_tile_x_clamps_out_of_range() {
        assert_eq!(lon_to_tile_x(180.0, 4), 15);
        assert_eq!(lon_to_tile_x(500.0, 4), 15);
        assert_eq!(lon_to_tile_x(-500.0, 4), 0);
        assert_eq!(lon_to_tile_x(f64::NAN, 4), 0);
    }

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        assert_eq!(lon_to_tile_x(-74.0060, 16), 19295);
        assert_eq!(lat_to_tile_y(40.7128, 16), 24640);
    }

    #[test]
    fn test_lat_to_tile_y_low_zooms() {
        assert_eq!(lat_to_tile_y(0.0, 0), 0);
        assert_eq!(lat_to_tile_y(85.0, 1), 0);
        assert_eq!(lat_to_tile_y(-85.0, 1), 1);
    }

    #[test]
    fn test_pole_clamp() {
        for zoom in [0, 1, 5, 10, 19] {
            assert_eq!(
                lat_to_tile_y(90.0, zoom),
                lat_to_tile_y(MERCATOR_MAX_LAT, zoom),
                "north pole at zoom {}",
                zoom
            );
            assert_eq!(
                lat_to_tile_y(-90.0, zoom),
                lat_to_tile_y(-MERCATOR_MAX_LAT, zoom),
                "south pole at zoom {}",
                zoom
            );
        }
        assert_eq!(lat_to_tile_y(90.0, 10), 0);
        assert_eq!(lat_to_tile_y(-90.0, 10), 1023);
    }

    #[test]
    fn test_flip_row() {
        assert_eq!(flip_row(0, 0), 0);
        assert_eq!(flip_row(0, 3), 7);
        assert_eq!(flip_row(7, 3), 0);
        assert_eq!(flip_row(2, 3), 5);
    }

    #[test]
    fn test_x_segments_normal_range() {
        let segments = x_segments_for_bounds(0.0, 10.0, 10);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].min <= segments[0].max);
        assert_eq!(segments[0].min, 512);
    }

    #[test]
    fn test_x_segments_dateline_crossing() {
        let segments = x_segments_for_bounds(170.0, -170.0, 10);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], XSegment::new(lon_to_tile_x(170.0, 10), 1023));
        assert_eq!(segments[1], XSegment::new(0, lon_to_tile_x(-170.0, 10)));
    }

    #[test]
    fn test_x_segments_full_world() {
        for zoom in [0, 1, 10] {
            let segments = x_segments_for_bounds(-180.0, 180.0, zoom);
            assert_eq!(segments, vec![XSegment::new(0, tiles_per_axis(zoom) - 1)]);
        }
    }

    #[test]
    fn test_x_segments_reversed_whole_world() {
        // Span magnitude counts, not direction
        let segments = x_segments_for_bounds(180.0, -180.0, 3);
        assert_eq!(segments, vec![XSegment::new(0, 7)]);
    }

    #[test]
    fn test_x_segments_unnormalized_edges() {
        // 190°E is 170°W: same span as -175..-170
        let segments = x_segments_for_bounds(185.0, 190.0, 8);
        let expected = x_segments_for_bounds(-175.0, -170.0, 8);
        assert_eq!(segments, expected);
    }

    #[test]
    fn test_y_range_is_ascending() {
        let range = y_range_for_bounds(10.0, 0.0, 5);
        assert!(range.min <= range.max);
        let inverted = y_range_for_bounds(0.0, 10.0, 5);
        assert_eq!(range, inverted);
    }

    #[test]
    fn test_tile_count_for_bounds() {
        let world = Bounds::new(85.0, -85.0, 180.0, -180.0);
        assert_eq!(tile_count_for_bounds(&world, 0), 1);
        assert_eq!(tile_count_for_bounds(&world, 2), 16);

        let point = Bounds::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(tile_count_for_bounds(&point, 10), 1);
    }

    #[test]
    fn test_bounds_normalized() {
        let bounds = Bounds::new(-10.0, 20.0, 5.0, 1.0).normalized();
        assert_eq!(bounds.north, 20.0);
        assert_eq!(bounds.south, -10.0);
        assert_eq!(bounds.east, 5.0);
        assert_eq!(bounds.west, 1.0);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_lon_to_tile_x_in_range(lon in -180.0..180.0_f64, zoom in 0u8..=20) {
                let x = lon_to_tile_x(lon, zoom);
                prop_assert!(x < tiles_per_axis(zoom));
            }

            #[test]
            fn prop_lon_to_tile_x_monotonic(
                a in -180.0..180.0_f64,
                b in -180.0..180.0_f64,
                zoom in 0u8..=20
            ) {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(lon_to_tile_x(lo, zoom) <= lon_to_tile_x(hi, zoom));
            }

            #[test]
            fn prop_lat_to_tile_y_in_range(lat in -90.0..=90.0_f64, zoom in 0u8..=20) {
                let y = lat_to_tile_y(lat, zoom);
                prop_assert!(y < tiles_per_axis(zoom));
            }

            #[test]
            fn prop_normalize_lon_range(lon in -10_000.0..10_000.0_f64) {
                let normalized = normalize_lon(lon);
                prop_assert!((MIN_LON..MAX_LON).contains(&normalized));
            }

            #[test]
            fn prop_segments_within_world(
                west in -400.0..400.0_f64,
                east in -400.0..400.0_f64,
                zoom in 0u8..=16
            ) {
                let n = tiles_per_axis(zoom);
                let segments = x_segments_for_bounds(west, east, zoom);
                prop_assert!(!segments.is_empty() && segments.len() <= 2);
                for segment in segments {
                    prop_assert!(segment.min <= segment.max);
                    prop_assert!(segment.max < n);
                }
            }
        }
    }
}
