//! Build a route profile from an in-memory GPX document.
//!
//! Run with: cargo run --example elevation_profile

use route_profile::{ChartSeries, LoaderConfig, MapProjection, RawPoint, Track};

fn main() {
    // A climb out of Chiplun and back, one point roughly every 100m
    let raw: Vec<RawPoint> = (0..60)
        .map(|i| {
            let t = i as f64;
            let elevation = 20.0 + 180.0 * (t * std::f64::consts::PI / 59.0).sin();
            RawPoint::new(17.5333 + t * 0.0009, 73.5167 + t * 0.0002, Some(elevation))
        })
        .collect();

    let track = Track::from_raw_points(&raw);
    let config = LoaderConfig::default();

    println!("Route Profile\n");
    println!("  points:    {}", track.len());
    println!("  distance:  {:.2}km", track.total_distance_km());
    println!("  climbing:  {:.0}m up / {:.0}m down", track.elevation_gain_m(), track.elevation_loss_m());

    let map = MapProjection::from_track(&track, &config);
    println!(
        "  center:    ({:.4}, {:.4}) zoom {}\n",
        map.center.latitude, map.center.longitude, map.zoom
    );

    let chart = ChartSeries::from_track(&track, &config);
    println!("Elevation profile (every {}th point):", chart.stride);
    for point in &chart.points {
        let bar = "#".repeat((point.elevation_m / 10.0) as usize);
        println!("  {:>7} {:>5.0}m {}", point.label, point.elevation_m, bar);
    }
}
