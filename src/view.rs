//! Load state for a single route widget.
//!
//! A [`RouteView`] owns the track it loaded and exposes it through three states:
//! `Loading` (initial), `Loaded` and `Failed`. Every call to [`RouteView::load`]
//! starts a new generation; only the most recently started load may publish its
//! result, so a slow stale load can never overwrite a newer one.
//!
//! Derived map and chart views are always available. While loading or after a
//! failure they are the empty fallback views.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::watch;

use crate::error::LoadError;
use crate::http::TrackFetcher;
use crate::{ChartSeries, LoaderConfig, MapProjection, SharedTrack, Track};

/// Observable state of a route view.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded(SharedTrack),
    /// Load failed; holds the logged error message
    Failed(String),
}

impl LoadState {
    pub fn track(&self) -> Option<&SharedTrack> {
        match self {
            LoadState::Loaded(track) => Some(track),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }
}

/// Route widget state: the current track plus its derived views.
pub struct RouteView {
    state: watch::Sender<LoadState>,
    generation: AtomicU64,
    config: LoaderConfig,
}

impl RouteView {
    pub fn new(config: LoaderConfig) -> Self {
        let (state, _) = watch::channel(LoadState::Loading);
        Self {
            state,
            generation: AtomicU64::new(0),
            config,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    pub fn track(&self) -> Option<SharedTrack> {
        self.state.borrow().track().cloned()
    }

    /// Load `url` with `fetcher` and publish the outcome.
    ///
    /// Returns `true` if this load's result was published, `false` if a newer
    /// load started while it was in flight.
    pub async fn load(&self, fetcher: &TrackFetcher, url: &str) -> bool {
        self.load_with(fetcher.load(url)).await
    }

    /// Run any track-producing future as a load of this view.
    pub async fn load_with<F>(&self, load: F) -> bool
    where
        F: Future<Output = Result<Track, LoadError>>,
    {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = LoadState::Loading;
        });
        debug!("[RouteView] Load #{} started", generation);

        let next = match load.await {
            Ok(track) => {
                info!(
                    "[RouteView] Load #{} finished: {} points, {:.2}km",
                    generation,
                    track.len(),
                    track.total_distance_km()
                );
                LoadState::Loaded(Arc::new(track))
            }
            Err(e) => {
                warn!("[RouteView] Load #{} failed: {}", generation, e);
                LoadState::Failed(e.to_string())
            }
        };

        let published = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = next;
            true
        });

        if !published {
            debug!("[RouteView] Load #{} superseded, result discarded", generation);
        }
        published
    }

    /// Map view of the current track, or the fallback view.
    pub fn map_projection(&self) -> MapProjection {
        match self.track() {
            Some(track) => MapProjection::from_track(&track, &self.config),
            None => MapProjection::empty(&self.config),
        }
    }

    /// Chart view of the current track, or an empty series.
    pub fn chart_series(&self) -> ChartSeries {
        match self.track() {
            Some(track) => ChartSeries::from_track(&track, &self.config),
            None => ChartSeries::default(),
        }
    }
}

impl Default for RouteView {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::RawPoint;
    use tokio::sync::oneshot;

    fn track(n: usize) -> Track {
        let raw: Vec<RawPoint> = (0..n)
            .map(|i| RawPoint::new(0.0, i as f64 * 0.01, Some(10.0)))
            .collect();
        Track::from_raw_points(&raw)
    }

    #[tokio::test]
    async fn test_initial_state_is_loading() {
        let view = RouteView::default();
        assert!(view.state().is_loading());
        assert!(view.map_projection().is_empty());
        assert!(view.chart_series().is_empty());
    }

    #[tokio::test]
    async fn test_loaded() {
        let view = RouteView::default();
        assert!(view.load_with(async { Ok(track(21)) }).await);

        let state = view.state();
        assert_eq!(state.track().map(|t| t.len()), Some(21));
        assert_eq!(view.chart_series().len(), 3);
        assert_eq!(view.map_projection().center, track(21).points()[10].position());
    }

    #[tokio::test]
    async fn test_failed_falls_back_to_empty_views() {
        let config = LoaderConfig::default();
        let view = RouteView::new(config.clone());
        view.load_with(async { Err(LoadError::Parse(ParseError::NoPoints)) }).await;

        assert!(view.state().is_failed());
        assert!(view.track().is_none());
        assert_eq!(view.map_projection(), MapProjection::empty(&config));
        assert!(view.chart_series().is_empty());
    }

    #[tokio::test]
    async fn test_http_failures_fall_back_to_empty_views() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.gpx"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken.gpx"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops"))
            .mount(&server)
            .await;

        let config = LoaderConfig::default();
        let fetcher = TrackFetcher::new(config.clone()).unwrap();
        let view = RouteView::new(config.clone());

        for route in ["/missing.gpx", "/broken.gpx"] {
            let url = format!("{}{}", server.uri(), route);
            assert!(view.load(&fetcher, &url).await);

            assert!(view.state().is_failed(), "{}", route);
            assert!(view.track().is_none());
            assert_eq!(view.map_projection(), MapProjection::empty(&config));
            assert_eq!(view.map_projection().center, config.fallback_center);
            assert!(view.chart_series().is_empty());
        }
    }

    #[tokio::test]
    async fn test_reload_replaces_failure() {
        let view = RouteView::default();
        view.load_with(async { Err(LoadError::Client("boom".into())) }).await;
        assert!(view.state().is_failed());

        view.load_with(async { Ok(track(2)) }).await;
        assert_eq!(view.track().map(|t| t.len()), Some(2));
    }

    #[tokio::test]
    async fn test_last_started_load_wins() {
        let view = RouteView::default();
        let (slow_tx, slow_rx) = oneshot::channel::<Track>();
        let (fast_tx, fast_rx) = oneshot::channel::<Track>();

        let slow = view.load_with(async move {
            slow_rx.await.map_err(|e| LoadError::Client(e.to_string()))
        });
        let fast = view.load_with(async move {
            fast_rx.await.map_err(|e| LoadError::Client(e.to_string()))
        });

        let driver = async {
            // Let both loads start before resolving them, newer one first
            tokio::task::yield_now().await;
            fast_tx.send(track(5)).unwrap();
            tokio::task::yield_now().await;
            slow_tx.send(track(50)).unwrap();
        };

        let (slow_published, fast_published, ()) = tokio::join!(slow, fast, driver);

        assert!(fast_published);
        assert!(!slow_published);
        assert_eq!(view.track().map(|t| t.len()), Some(5));
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let view = RouteView::default();
        let mut rx = view.subscribe();

        view.load_with(async { Ok(track(3)) }).await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().track().map(|t| t.len()), Some(3));
    }
}
