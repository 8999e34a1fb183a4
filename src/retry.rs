//! Backoff for translation fetches.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How often, and how patiently, a failed fetch is repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts including the first one
    pub max_attempts: u32,
    /// Pause before the first retry
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Growth factor applied to the pause after each retry
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    /// Set the maximum delay between retries
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the backoff multiplier
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Preset: a single attempt, no retries
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Preset: translation file fetches
    /// Delays: 250ms, 500ms, ... capped at 2s
    pub fn translation_fetch(max_attempts: u32) -> Self {
        Self::new(max_attempts.max(1), Duration::from_millis(250))
            .with_max_delay(Duration::from_secs(2))
            .with_backoff_multiplier(2.0)
    }

    /// Pause before the `retry`-th retry (1-indexed), capped at `max_delay`.
    fn delay_before_retry(&self, retry: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(retry.saturating_sub(1) as i32);
        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }

    /// Run `fetch` against `url` until it succeeds, fails with an error
    /// `should_retry` rejects, or the attempts run out.
    ///
    /// A missing translation file (404) will not appear on a second request,
    /// while a dropped connection or a 5xx might. A `max_attempts` of 0 is
    /// treated as 1.
    pub async fn run<T, E, F, Fut, P>(&self, url: &str, mut fetch: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        P: Fn(&E) -> bool,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match fetch().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} fetched on attempt {}/{}", url, attempt, max_attempts);
                    }
                    return Ok(value);
                }
                Err(e) if attempt < max_attempts && should_retry(&e) => {
                    let delay = self.delay_before_retry(attempt);
                    warn!(
                        "Fetching {} failed on attempt {}/{} ({}), retrying in {:?}",
                        url, attempt, max_attempts, e, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if attempt > 1 {
                        debug!("Giving up on {} after {} attempts: {}", url, attempt, e);
                    }
                    return Err(e);
                }
            }
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::none()
    }
}
