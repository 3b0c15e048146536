//! # Geographic Utilities
//!
//! Distance and extent computations for GPS tracks.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance_km`] | Great-circle distance between two GPS points |
//! | [`cumulative_distances_km`] | Running distance from the first point, per point |
//! | [`to_line_string`] | Convert points to a `geo` line string (x = lng, y = lat) |
//! | [`compute_bounds`] | Bounding box of a GPS track |
//!
//! ## Example
//!
//! ```rust
//! use route_profile::{GpsPoint, geo_utils};
//!
//! let track = vec![
//!     GpsPoint::new(17.5333, 73.5167), // Chiplun
//!     GpsPoint::new(17.5400, 73.5200),
//!     GpsPoint::new(17.5500, 73.5300),
//! ];
//!
//! let distances = geo_utils::cumulative_distances_km(&track);
//! assert_eq!(distances[0], 0.0);
//! println!("Track length: {:.2}km", distances[2]);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! ```text
//! a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)
//! d = 2R·atan2(√a, √(1−a))
//! ```
//!
//! with R = 6371 km. The radius is fixed rather than taken from `geo`'s mean radius
//! so that distances match the values published on route pages.
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)

use geo::{BoundingRect, Coord, LineString};
use crate::{Bounds, GpsPoint};

/// Spherical earth radius used for all distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points in kilometers.
///
/// # Example
///
/// ```rust
/// use route_profile::{GpsPoint, geo_utils};
///
/// let a = GpsPoint::new(0.0, 0.0);
/// let b = GpsPoint::new(0.0, 1.0);
///
/// // One degree of longitude at the equator
/// let distance = geo_utils::haversine_distance_km(&a, &b);
/// assert!((distance - 111.195).abs() < 0.001);
/// ```
#[inline]
pub fn haversine_distance_km(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lon = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Running distance from the first point, one entry per input point.
///
/// The first entry is exactly 0.0 and the sequence never decreases.
/// Empty input gives an empty vector.
pub fn cumulative_distances_km(points: &[GpsPoint]) -> Vec<f64> {
    let mut distances = Vec::with_capacity(points.len());
    let mut total = 0.0;

    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            total += haversine_distance_km(&points[i - 1], point);
        }
        distances.push(total);
    }

    distances
}

// =============================================================================
// Extent Functions
// =============================================================================

/// Convert GPS points to a `geo` line string (x = longitude, y = latitude).
pub fn to_line_string(points: &[GpsPoint]) -> LineString<f64> {
    points
        .iter()
        .map(|p| Coord { x: p.longitude, y: p.latitude })
        .collect()
}

/// Compute the bounding box of a GPS track.
///
/// Returns `None` for empty input.
///
/// ```rust
/// use route_profile::{GpsPoint, geo_utils};
///
/// let track = vec![
///     GpsPoint::new(51.5000, -0.1300),
///     GpsPoint::new(51.5100, -0.1200),
///     GpsPoint::new(51.5050, -0.1250),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&track).unwrap();
/// assert_eq!(bounds.min_lat, 51.5000);
/// assert_eq!(bounds.max_lng, -0.1200);
/// ```
pub fn compute_bounds(points: &[GpsPoint]) -> Option<Bounds> {
    let rect = to_line_string(points).bounding_rect()?;
    Some(Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(17.5333, 73.5167);
        assert_eq!(haversine_distance_km(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_symmetric() {
        let a = GpsPoint::new(17.5333, 73.5167);
        let b = GpsPoint::new(18.5204, 73.8567);
        assert_eq!(haversine_distance_km(&a, &b), haversine_distance_km(&b, &a));
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // London to Paris is approximately 344 km
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        let dist = haversine_distance_km(&london, &paris);
        assert!(approx_eq(dist, 343.56, 5.0));
    }

    #[test]
    fn test_one_degree_at_equator() {
        let d = haversine_distance_km(&GpsPoint::new(0.0, 0.0), &GpsPoint::new(0.0, 1.0));
        let expected = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
        assert!(approx_eq(d, expected, 1e-9));
    }

    #[test]
    fn test_cumulative_distances_empty() {
        assert!(cumulative_distances_km(&[]).is_empty());
    }

    #[test]
    fn test_cumulative_distances_single_point() {
        assert_eq!(cumulative_distances_km(&[GpsPoint::new(10.0, 20.0)]), vec![0.0]);
    }

    #[test]
    fn test_cumulative_distances_increments() {
        let points: Vec<GpsPoint> = (0..25)
            .map(|i| GpsPoint::new(17.5 + (i as f64 * 0.37).sin() * 0.01, 73.5 + i as f64 * 0.002))
            .collect();
        let distances = cumulative_distances_km(&points);

        assert_eq!(distances.len(), points.len());
        assert_eq!(distances[0], 0.0);
        for i in 1..points.len() {
            let step = haversine_distance_km(&points[i - 1], &points[i]);
            assert!(distances[i] >= distances[i - 1]);
            assert!(approx_eq(distances[i] - distances[i - 1], step, 1e-6));
        }
        let summed: f64 = points.windows(2).map(|w| haversine_distance_km(&w[0], &w[1])).sum();
        assert!(approx_eq(*distances.last().unwrap(), summed, 1e-9));
    }

    #[test]
    fn test_cumulative_distances_repeated_point() {
        let p = GpsPoint::new(17.5, 73.5);
        assert_eq!(cumulative_distances_km(&[p, p, p]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_compute_bounds() {
        let track = vec![
            GpsPoint::new(51.50, -0.13),
            GpsPoint::new(51.51, -0.12),
            GpsPoint::new(51.505, -0.125),
        ];
        let bounds = compute_bounds(&track).unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.12);
    }

    #[test]
    fn test_compute_bounds_empty() {
        assert!(compute_bounds(&[]).is_none());
    }

    #[test]
    fn test_line_string_axis_order() {
        let line = to_line_string(&[GpsPoint::new(17.0, 73.0)]);
        assert_eq!(line.0[0], Coord { x: 73.0, y: 17.0 });
    }
}
