//! Derived views of a track for map and chart renderers.
//!
//! Both views are recomputed from a [`Track`] on demand and never stored.
//! An empty track yields an empty path centered on the configured fallback
//! center, and an empty chart series.

use crate::{Bounds, GpsPoint, LoaderConfig, Track, TrackPoint};

/// Ordered path and framing for a tile-based map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapProjection {
    /// Route coordinates in track order
    pub path: Vec<GpsPoint>,
    /// Point at index `floor(n / 2)`, or the fallback center for an empty track
    pub center: GpsPoint,
    /// Extent of the path, if any
    pub bounds: Option<Bounds>,
    /// Initial zoom level
    pub zoom: u32,
}

impl MapProjection {
    pub fn from_track(track: &Track, config: &LoaderConfig) -> Self {
        Self::from_points(track.points(), config)
    }

    /// The center is the middle sample of the route, not a centroid, so it always
    /// lies on the drawn path.
    pub fn from_points(points: &[TrackPoint], config: &LoaderConfig) -> Self {
        let path: Vec<GpsPoint> = points.iter().map(TrackPoint::position).collect();
        let center = path
            .get(path.len() / 2)
            .copied()
            .unwrap_or(config.fallback_center);
        let bounds = Bounds::from_points(&path);

        Self {
            path,
            center,
            bounds,
            zoom: config.map_zoom,
        }
    }

    /// Fallback view shown while loading or after a failed load.
    pub fn empty(config: &LoaderConfig) -> Self {
        Self::from_points(&[], config)
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Path as `[lat, lng]` pairs, the shape leaflet-style polylines take.
    pub fn latlngs(&self) -> Vec<[f64; 2]> {
        self.path.iter().map(|p| [p.latitude, p.longitude]).collect()
    }
}

/// One sample of the elevation profile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartPoint {
    /// Distance label for the x axis, e.g. `"12.3km"`
    pub label: String,
    pub distance_km: f64,
    pub elevation_m: f64,
}

/// Decimated distance/elevation series for a line chart.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
    /// Stride the series was sampled with
    pub stride: u32,
}

impl ChartSeries {
    pub fn from_track(track: &Track, config: &LoaderConfig) -> Self {
        Self::with_stride(track.points(), config.chart_stride)
    }

    /// Keep the points whose index is a multiple of `stride`.
    ///
    /// The result has `ceil(n / stride)` entries and entry `i` is point `stride * i`.
    /// A stride of 0 is treated as 1.
    pub fn with_stride(points: &[TrackPoint], stride: u32) -> Self {
        let stride = stride.max(1);
        let points = points
            .iter()
            .step_by(stride as usize)
            .map(|p| ChartPoint {
                label: format_distance_label(p.cumulative_distance),
                distance_km: p.cumulative_distance,
                elevation_m: p.elevation,
            })
            .collect();

        Self { points, stride }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    pub fn elevations(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.elevation_m).collect()
    }
}

// ============================================================================
// Axis and tooltip formatting
// ============================================================================

/// Distance label with one decimal, e.g. `12.34` → `"12.3km"`.
pub fn format_distance_label(km: f64) -> String {
    format!("{}km", to_fixed(km, 1))
}

/// Elevation axis tick, e.g. `150` → `"150m"`.
pub fn format_elevation_tick(meters: f64) -> String {
    format!("{}m", meters)
}

/// Elevation tooltip rounded to whole meters, e.g. `151.6` → `"152m"`.
pub fn format_elevation_tooltip(meters: f64) -> String {
    format!("{}m", to_fixed(meters, 0))
}

/// Digits inspected past the rounding position to tell an exact half from a
/// value that only prints like one.
const TIE_GUARD_DIGITS: usize = 40;

/// Fixed-point formatting that rounds exact halves away from zero.
///
/// `{:.N}` sends exact halves to even (`150.5` → `"150"`, not `"151"`). Values
/// stored just below a half, like `0.35`, keep the standard rounding.
fn to_fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("{:.*}", decimals, value);
    }

    let expanded = format!("{:.*}", decimals + 1 + TIE_GUARD_DIGITS, value);
    let (head, tail) = expanded.split_at(expanded.len() - 1 - TIE_GUARD_DIGITS);
    let exact_half = tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0');
    if !exact_half {
        return format!("{:.*}", decimals, value);
    }

    let truncated = head.strip_suffix('.').unwrap_or(head);
    increment_magnitude(truncated)
}

/// Add one unit in the last place of a decimal string, away from zero.
fn increment_magnitude(digits: &str) -> String {
    let mut chars: Vec<char> = digits.chars().collect();
    let mut i = chars.len();

    loop {
        if i == 0 {
            chars.insert(0, '1');
            break;
        }
        i -= 1;
        match chars[i] {
            '.' => continue,
            '-' => {
                chars.insert(i + 1, '1');
                break;
            }
            '9' => chars[i] = '0',
            d => {
                chars[i] = (d as u8 + 1) as char;
                break;
            }
        }
    }

    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawPoint;

    fn line_track(n: usize) -> Track {
        let raw: Vec<RawPoint> = (0..n)
            .map(|i| RawPoint::new(17.5, 73.5 + i as f64 * 0.001, Some(i as f64)))
            .collect();
        Track::from_raw_points(&raw)
    }

    #[test]
    fn test_chart_length_is_ceil() {
        for n in [0usize, 1, 9, 10, 11, 20, 21, 99, 100, 101] {
            let series = ChartSeries::from_track(&line_track(n), &LoaderConfig::default());
            assert_eq!(series.len(), n.div_ceil(10), "n = {}", n);
        }
    }

    #[test]
    fn test_chart_entries_map_to_every_tenth_point() {
        let track = line_track(35);
        let series = ChartSeries::from_track(&track, &LoaderConfig::default());

        for (i, cp) in series.points.iter().enumerate() {
            let original = &track.points()[i * 10];
            assert_eq!(cp.elevation_m, original.elevation);
            assert_eq!(cp.distance_km, original.cumulative_distance);
            assert_eq!(cp.label, format_distance_label(original.cumulative_distance));
        }
    }

    #[test]
    fn test_chart_stride_zero_keeps_everything() {
        let track = line_track(5);
        let series = ChartSeries::with_stride(track.points(), 0);
        assert_eq!(series.len(), 5);
        assert_eq!(series.stride, 1);
    }

    #[test]
    fn test_center_is_middle_index() {
        let track = line_track(7);
        let map = MapProjection::from_track(&track, &LoaderConfig::default());
        assert_eq!(map.center, track.points()[3].position());
        assert_eq!(map.path.len(), 7);

        let even = line_track(4);
        let map = MapProjection::from_track(&even, &LoaderConfig::default());
        assert_eq!(map.center, even.points()[2].position());
    }

    #[test]
    fn test_center_is_not_centroid() {
        // Points bunched at the start: centroid and middle index disagree
        let track = Track::from_raw_points(&[
            RawPoint::new(0.0, 0.0, None),
            RawPoint::new(0.0, 0.1, None),
            RawPoint::new(0.0, 10.0, None),
        ]);
        let map = MapProjection::from_track(&track, &LoaderConfig::default());
        assert_eq!(map.center, GpsPoint::new(0.0, 0.1));
    }

    #[test]
    fn test_empty_projection_uses_fallback() {
        let config = LoaderConfig::default();
        let map = MapProjection::from_track(&Track::default(), &config);
        assert!(map.is_empty());
        assert_eq!(map.center, config.fallback_center);
        assert!(map.bounds.is_none());
        assert_eq!(map.zoom, 12);
        assert_eq!(map, MapProjection::empty(&config));
    }

    #[test]
    fn test_equator_scenario() {
        let track = Track::from_raw_points(&[
            RawPoint::new(0.0, 0.0, Some(100.0)),
            RawPoint::new(0.0, 1.0, Some(150.0)),
            RawPoint::new(0.0, 2.0, Some(120.0)),
        ]);
        let config = LoaderConfig::default();

        let chart = ChartSeries::from_track(&track, &config);
        assert_eq!(chart.labels(), vec!["0.0km".to_string()]);
        assert_eq!(chart.elevations(), vec![100.0]);

        let map = MapProjection::from_track(&track, &config);
        assert_eq!(map.center, GpsPoint::new(0.0, 1.0));
        assert_eq!(map.latlngs(), vec![[0.0, 0.0], [0.0, 1.0], [0.0, 2.0]]);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_distance_label(12.34), "12.3km");
        assert_eq!(format_distance_label(0.0), "0.0km");
        assert_eq!(format_elevation_tick(150.0), "150m");
        assert_eq!(format_elevation_tick(12.5), "12.5m");
        assert_eq!(format_elevation_tooltip(151.6), "152m");
    }

    #[test]
    fn test_formatting_rounds_halves_up() {
        assert_eq!(format_elevation_tooltip(150.5), "151m");
        assert_eq!(format_elevation_tooltip(2.5), "3m");
        assert_eq!(format_elevation_tooltip(9.5), "10m");
        assert_eq!(format_elevation_tooltip(-2.5), "-3m");
        assert_eq!(format_distance_label(0.25), "0.3km");
        assert_eq!(format_distance_label(9.75), "9.8km");

        // Stored just below the half, so it rounds down
        assert_eq!(format_distance_label(0.35), "0.3km");
        assert_eq!(format_elevation_tooltip(150.4), "150m");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_chart_point_json() {
        let cp = ChartPoint { label: "1.0km".into(), distance_km: 1.0, elevation_m: 20.0 };
        let json = serde_json::to_value(&cp).unwrap();
        assert_eq!(json["label"], "1.0km");
        assert_eq!(json["elevation_m"], 20.0);
    }
}
