//! GPX document parsing.
//!
//! Extracts an ordered list of [`RawPoint`]s from a GPX 1.0/1.1 document.
//! Track points (`trk`/`trkseg`/`trkpt`) are taken in document order across every
//! track and segment. Documents without track points fall back to route points
//! (`rte`/`rtept`). Waypoints (`wpt`) are never part of the path.

use std::io::Read;

use log::debug;

use crate::error::ParseError;
use crate::GpsPoint;

/// A parsed point before distance annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters, if the document carried one
    pub elevation: Option<f64>,
}

impl RawPoint {
    pub fn new(latitude: f64, longitude: f64, elevation: Option<f64>) -> Self {
        Self { latitude, longitude, elevation }
    }

    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}

/// Parse a GPX document held in memory.
pub fn parse_gpx(text: &str) -> Result<Vec<RawPoint>, ParseError> {
    parse_gpx_reader(text.as_bytes())
}

/// Parse a GPX document from any reader.
///
/// Fails with [`ParseError::NoPoints`] when the document has neither track nor
/// route points, and with [`ParseError::InvalidCoordinate`] on the first point
/// whose coordinate is outside WGS84 range.
pub fn parse_gpx_reader<R: Read>(reader: R) -> Result<Vec<RawPoint>, ParseError> {
    let doc = gpx::read(reader).map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

    let mut points: Vec<RawPoint> = doc
        .tracks
        .iter()
        .flat_map(|track| track.segments.iter())
        .flat_map(|segment| segment.points.iter())
        .map(waypoint_to_raw)
        .collect();

    if points.is_empty() {
        points = doc
            .routes
            .iter()
            .flat_map(|route| route.points.iter())
            .map(waypoint_to_raw)
            .collect();
        if !points.is_empty() {
            debug!("[GpxParser] No track points, using {} route points", points.len());
        }
    }

    if points.is_empty() {
        return Err(ParseError::NoPoints);
    }

    if let Some((index, bad)) = points
        .iter()
        .enumerate()
        .find(|(_, p)| !p.position().is_valid())
    {
        return Err(ParseError::InvalidCoordinate {
            index,
            latitude: bad.latitude,
            longitude: bad.longitude,
        });
    }

    debug!(
        "[GpxParser] Parsed {} points from {} tracks",
        points.len(),
        doc.tracks.len()
    );

    Ok(points)
}

fn waypoint_to_raw(waypoint: &gpx::Waypoint) -> RawPoint {
    let point = waypoint.point();
    RawPoint {
        latitude: point.y(),
        longitude: point.x(),
        elevation: waypoint.elevation,
    }
}
