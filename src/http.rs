//! HTTP client for loading GPX tracks.
//!
//! A load is one GET, a full body read, a GPX parse and distance annotation.
//! The caller sees a complete [`Track`] or a [`LoadError`], never partial data.
//! Retrieval failures are retried only when `LoaderConfig::max_retries` is non-zero;
//! parse failures are never retried.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::{Client, StatusCode};

use crate::error::{LoadError, Result};
use crate::{LoaderConfig, Track};

/// Result of one load inside a batch.
#[derive(Debug)]
pub struct TrackLoadResult {
    pub url: String,
    pub result: Result<Track>,
}

impl TrackLoadResult {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fetches and parses GPX tracks.
pub struct TrackFetcher {
    client: Client,
    config: LoaderConfig,
}

impl TrackFetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: LoaderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LoadError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Fetch, parse and annotate a single track.
    pub async fn load(&self, url: &str) -> Result<Track> {
        let start = Instant::now();

        let body = self.fetch_text(url).await?;
        let fetch_elapsed = start.elapsed();

        let track = Track::from_gpx_str(&body)?;

        info!(
            "[TrackFetcher] Loaded {} | {:.1}KB in {:?} | {} points, {:.2}km, total {:?}",
            url,
            body.len() as f64 / 1024.0,
            fetch_elapsed,
            track.len(),
            track.total_distance_km(),
            start.elapsed()
        );

        Ok(track)
    }

    /// Load several tracks concurrently.
    ///
    /// Results come back in input order. Each load is independent, so one failure
    /// does not affect the others.
    pub async fn load_all(&self, urls: Vec<String>) -> Vec<TrackLoadResult> {
        use futures::stream::{self, StreamExt};

        let total = urls.len();
        let concurrency = self.config.max_concurrency.max(1) as usize;
        info!(
            "[TrackFetcher] Starting load of {} tracks (max concurrent: {})",
            total, concurrency
        );

        let results: Vec<TrackLoadResult> = stream::iter(urls)
            .map(|url| async move {
                let result = self.load(&url).await;
                if let Err(ref e) = result {
                    warn!("[TrackFetcher] {} failed: {}", url, e);
                }
                TrackLoadResult { url, result }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let success_count = results.iter().filter(|r| r.is_success()).count();
        info!(
            "[TrackFetcher] DONE: {}/{} tracks loaded ({} errors)",
            success_count,
            total,
            total - success_count
        );

        results
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let mut retries = 0;

        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(attempt) => {
                    if !attempt.retryable || retries >= self.config.max_retries {
                        return Err(attempt.error);
                    }
                    retries += 1;

                    let wait = backoff(self.config.retry_backoff_ms, retries);
                    warn!(
                        "[TrackFetcher] {}: {}, retry {} after {:?}",
                        url, attempt.error, retries, wait
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<String, FailedAttempt> {
        debug!("[TrackFetcher] GET {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FailedAttempt::retryable(LoadError::retrieval(url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let error = LoadError::retrieval(url, format!("HTTP {}", status));
            return Err(if is_retryable_status(status) {
                FailedAttempt::retryable(error)
            } else {
                FailedAttempt::fatal(error)
            });
        }

        resp.text()
            .await
            .map_err(|e| FailedAttempt::retryable(LoadError::retrieval(url, format!("body read: {}", e))))
    }
}

struct FailedAttempt {
    error: LoadError,
    retryable: bool,
}

impl FailedAttempt {
    fn retryable(error: LoadError) -> Self {
        Self { error, retryable: true }
    }

    fn fatal(error: LoadError) -> Self {
        Self { error, retryable: false }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Exponential backoff: base, 2×base, 4×base, capped at 8×base.
fn backoff(base_ms: u64, retry: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(1 << (retry.saturating_sub(1)).min(3)))
}

/// Synchronous wrapper for FFI - runs the async load on a private runtime
#[cfg(feature = "ffi")]
pub(crate) fn load_track_blocking(url: &str, config: &LoaderConfig) -> Result<Track> {
    use tokio::runtime::Builder;

    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LoadError::Client(format!("runtime error: {}", e)))?;

    let fetcher = TrackFetcher::new(config.clone())?;
    rt.block_on(fetcher.load(url))
}
