//! # Route Profile
//!
//! GPX route loading and geometry for route map and elevation chart widgets.
//!
//! This library provides:
//! - GPX parsing into an ordered point sequence (elevation defaults to 0)
//! - Cumulative distance along the route using the haversine formula
//! - Derived views: a map path with a center coordinate, and a decimated
//!   distance/elevation series for charting
//! - An async loader with a three-state view (`Loading`, `Loaded`, `Failed`)
//!
//! ## Features
//!
//! - **`http`** (default) - Enable the HTTP track fetcher and [`RouteView`]
//! - **`serde`** - Derive `Serialize`/`Deserialize` on all output types
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_profile::{Track, LoaderConfig, ChartSeries, MapProjection};
//!
//! let gpx = r#"<?xml version="1.0"?>
//! <gpx version="1.1" creator="example">
//!   <trk><trkseg>
//!     <trkpt lat="0" lon="0"><ele>100</ele></trkpt>
//!     <trkpt lat="0" lon="1"><ele>150</ele></trkpt>
//!     <trkpt lat="0" lon="2"><ele>120</ele></trkpt>
//!   </trkseg></trk>
//! </gpx>"#;
//!
//! let track = Track::from_gpx_str(gpx).unwrap();
//! let config = LoaderConfig::default();
//!
//! let map = MapProjection::from_track(&track, &config);
//! assert_eq!(map.center.longitude, 1.0);
//!
//! let chart = ChartSeries::from_track(&track, &config);
//! assert_eq!(chart.points.len(), 1);
//! println!("Route: {:.2}km", track.total_distance_km());
//! ```

use std::sync::Arc;

pub mod error;
pub use error::{LoadError, ParseError};

pub mod geo_utils;

pub mod gpx_parser;
pub use gpx_parser::{parse_gpx, RawPoint};

pub mod display;
pub use display::{
    format_distance_label, format_elevation_tick, format_elevation_tooltip,
    ChartPoint, ChartSeries, MapProjection,
};

// HTTP module for track fetching
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{TrackFetcher, TrackLoadResult};

// Load-state view over the fetcher
#[cfg(feature = "http")]
pub mod view;

#[cfg(feature = "http")]
pub use view::{LoadState, RouteView};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("RouteProfileRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use route_profile::GpsPoint;
/// let point = GpsPoint::new(17.5333, 73.5167); // Chiplun
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box for a route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        geo_utils::compute_bounds(points)
    }
}

/// One sampled position along a route, annotated with its distance from the start.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters (0 when the source had none)
    pub elevation: f64,
    /// Kilometers from the first point of the track
    pub cumulative_distance: f64,
}

impl TrackPoint {
    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}

/// An ordered, distance-annotated route.
///
/// A track can only be built from raw points through [`Track::from_raw_points`]
/// (or the GPX helpers on top of it), so every track satisfies:
/// - points keep the input order exactly
/// - the first point has `cumulative_distance == 0.0`
/// - `cumulative_distance` never decreases
///
/// There is no mutation API. Loading again produces a new track.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Track {
    points: Vec<TrackPoint>,
}

impl Track {
    /// Annotate raw points with cumulative haversine distance.
    ///
    /// Missing elevations become 0.
    pub fn from_raw_points(raw: &[RawPoint]) -> Self {
        let positions: Vec<GpsPoint> = raw.iter().map(RawPoint::position).collect();
        let distances = geo_utils::cumulative_distances_km(&positions);

        let points = raw
            .iter()
            .zip(distances)
            .map(|(p, cumulative_distance)| TrackPoint {
                latitude: p.latitude,
                longitude: p.longitude,
                elevation: p.elevation.unwrap_or(0.0),
                cumulative_distance,
            })
            .collect();

        Self { points }
    }

    /// Parse a GPX document and annotate it.
    pub fn from_gpx_str(text: &str) -> Result<Self, ParseError> {
        let raw = parse_gpx(text)?;
        Ok(Self::from_raw_points(&raw))
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TrackPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrackPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackPoint> {
        self.points.iter()
    }

    /// Coordinates only, in track order.
    pub fn positions(&self) -> Vec<GpsPoint> {
        self.points.iter().map(TrackPoint::position).collect()
    }

    /// Total route length in kilometers (0 for an empty track).
    pub fn total_distance_km(&self) -> f64 {
        self.last().map_or(0.0, |p| p.cumulative_distance)
    }

    /// Sum of all elevation increases between consecutive points, in meters.
    pub fn elevation_gain_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].elevation - w[0].elevation).max(0.0))
            .sum()
    }

    /// Sum of all elevation decreases between consecutive points, in meters (positive).
    pub fn elevation_loss_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[0].elevation - w[1].elevation).max(0.0))
            .sum()
    }

    pub fn min_elevation_m(&self) -> Option<f64> {
        self.points.iter().map(|p| p.elevation).reduce(f64::min)
    }

    pub fn max_elevation_m(&self) -> Option<f64> {
        self.points.iter().map(|p| p.elevation).reduce(f64::max)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.positions())
    }

    pub fn into_points(self) -> Vec<TrackPoint> {
        self.points
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a TrackPoint;
    type IntoIter = std::slice::Iter<'a, TrackPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Shared handle to a loaded track.
pub type SharedTrack = Arc<Track>;

/// Configuration for loading and displaying routes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoaderConfig {
    /// Request timeout in seconds.
    /// Default: 30
    pub timeout_secs: u64,

    /// Extra attempts after a failed retrieval. Parse failures are never retried.
    /// Default: 0 (a single attempt)
    pub max_retries: u32,

    /// Base delay before the first retry; doubles on each further retry.
    /// Default: 200 ms
    pub retry_backoff_ms: u64,

    /// Maximum loads in flight for [`TrackFetcher::load_all`].
    /// Default: 4
    pub max_concurrency: u32,

    /// Keep every n-th point in the elevation chart. 0 behaves like 1.
    /// Default: 10
    pub chart_stride: u32,

    /// Map center used when there is no track to show.
    /// Default: Chiplun (17.5333, 73.5167)
    pub fallback_center: GpsPoint,

    /// Initial map zoom level.
    /// Default: 12
    pub map_zoom: u32,

    /// User-Agent header sent with track requests.
    pub user_agent: String,
}

/// Route shown by the club site's route widget.
pub const DEFAULT_TRACK_URL: &str = "https://raw.githubusercontent.com/raghavkharche8/ChiplunCyclingClub/refs/heads/main/2025-12-23_2724381816_Cyclothon%202025%20Updated.gpx";

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 0,
            retry_backoff_ms: 200,
            max_concurrency: 4,
            chart_stride: 10,
            fallback_center: GpsPoint::new(17.5333, 73.5167),
            map_zoom: 12,
            user_agent: concat!("route-profile/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ============================================================================
// FFI Exports (only when ffi feature is enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::{info, warn};

    /// Fetch and parse a GPX track. Returns `None` on any failure (already logged).
    #[uniffi::export]
    pub fn ffi_load_track(url: String, config: LoaderConfig) -> Option<Vec<TrackPoint>> {
        init_logging();
        info!("[RouteProfileRust] ffi_load_track called for {}", url);
        match http::load_track_blocking(&url, &config) {
            Ok(track) => {
                info!(
                    "[RouteProfileRust] Loaded {} points, {:.2}km",
                    track.len(),
                    track.total_distance_km()
                );
                Some(track.into_points())
            }
            Err(e) => {
                warn!("[RouteProfileRust] Failed to load {}: {}", url, e);
                None
            }
        }
    }

    /// Parse a GPX document the host already downloaded.
    #[uniffi::export]
    pub fn ffi_parse_gpx(text: String) -> Option<Vec<TrackPoint>> {
        init_logging();
        match Track::from_gpx_str(&text) {
            Ok(track) => Some(track.into_points()),
            Err(e) => {
                warn!("[RouteProfileRust] Failed to parse GPX: {}", e);
                None
            }
        }
    }

    /// Map path, center and bounds for annotated points.
    #[uniffi::export]
    pub fn ffi_map_projection(points: Vec<TrackPoint>, config: LoaderConfig) -> MapProjection {
        MapProjection::from_points(&points, &config)
    }

    /// Decimated elevation series for annotated points.
    #[uniffi::export]
    pub fn ffi_chart_series(points: Vec<TrackPoint>, stride: u32) -> ChartSeries {
        ChartSeries::with_stride(&points, stride)
    }

    /// Get default loader configuration.
    #[uniffi::export]
    pub fn default_loader_config() -> LoaderConfig {
        LoaderConfig::default()
    }
}

// ============================================================================
// Tests
// ============================================================================
