//! HTTP retrieval with an optional fixed-retry decorator.
//!
//! The pipeline never talks to `reqwest` directly; it goes through the
//! [`FetchText`] trait so that retry behavior can be layered on as a
//! decorator and so tests can substitute in-memory fakes for the network.
//!
//! # Architecture
//!
//! - [`FetchText`]: core trait for an async GET returning body text
//! - [`HttpFetcher`]: wraps a shared `reqwest::Client` with a per-request timeout
//! - [`RetryFetch`]: decorator adding a small fixed retry count with jitter
//!
//! # Failure semantics
//!
//! `Ok(None)` means the server answered with a non-success status; that is
//! final and never retried. `Err(_)` means a transport failure (connect
//! error, timeout) and is the only thing [`RetryFetch`] retries.

use rand::{rng, Rng};
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// A desktop-browser User-Agent; several sources serve feeds and article
/// markup differently (or not at all) to obvious bot agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Trait for asynchronous text retrieval.
///
/// Implementors fetch a URL and return its body text. The orchestrator and
/// enricher are generic over this trait, which keeps the network at the
/// edge of the pipeline and lets tests drive the whole pass without sockets.
pub trait FetchText {
    /// Fetch `url` and return its body text.
    ///
    /// Returns `Ok(None)` for a non-success HTTP status and `Err` for a
    /// transport failure; both are recoverable-per-item from the caller's
    /// point of view.
    async fn fetch_text(&self, url: &str) -> Result<Option<String>, Box<dyn Error>>;
}

/// [`FetchText`] implementation backed by a shared `reqwest::Client`.
///
/// The client's connection pool is shared read-only across all concurrent
/// fetches in a pass; the per-request timeout comes from configuration.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher with the configured per-request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self, Box<dyn Error>> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl FetchText for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch_text(&self, url: &str) -> Result<Option<String>, Box<dyn Error>> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%status, "Non-success status; treating as no content");
            return Ok(None);
        }
        let body = response.text().await?;
        Ok(Some(body))
    }
}

/// Decorator that adds a fixed number of retries to any [`FetchText`].
///
/// Transport errors are retried up to `max_retries` times with a jittered
/// delay between attempts; non-success statuses pass straight through.
/// A timed-out fetch that exhausts its retries is indistinguishable from
/// any other failed fetch downstream.
#[derive(Debug)]
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: FetchText,
{
    /// Wrap `inner`, retrying transport errors up to `max_retries` times.
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }
}

impl<T> FetchText for RetryFetch<T>
where
    T: FetchText,
{
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch_text(&self, url: &str) -> Result<Option<String>, Box<dyn Error>> {
        let mut attempt = 0usize;
        loop {
            match self.inner.fetch_text(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        return Err(e);
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = self.base_delay + Duration::from_millis(jitter_ms);
                    warn!(attempt, max = self.max_retries, ?delay, error = %e, "Fetch failed; retrying");
                    sleep(delay).await;
                }
            }
        }
    }
}
