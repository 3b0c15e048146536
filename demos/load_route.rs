//! Load a GPX route over HTTP and print its map and chart views.
//!
//! Run with: cargo run --example load_route -- [URL]

use route_profile::{LoaderConfig, RouteView, TrackFetcher, DEFAULT_TRACK_URL};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_TRACK_URL.to_string());

    let config = LoaderConfig::default();
    let fetcher = TrackFetcher::new(config.clone())?;
    let view = RouteView::new(config);

    println!("Loading {}", url);
    view.load(&fetcher, &url).await;

    match view.track() {
        Some(track) => {
            println!(
                "Loaded {} points, {:.2}km, {:.0}m climbing",
                track.len(),
                track.total_distance_km(),
                track.elevation_gain_m()
            );
        }
        None => println!("No route data: {:?}", view.state()),
    }

    let map = view.map_projection();
    println!(
        "Map: {} path points centered at ({:.4}, {:.4})",
        map.path.len(),
        map.center.latitude,
        map.center.longitude
    );

    let chart = view.chart_series();
    println!("Chart: {} samples", chart.len());
    for point in chart.points.iter().take(10) {
        println!("  {:>7} {}", point.label, route_profile::format_elevation_tooltip(point.elevation_m));
    }

    Ok(())
}
