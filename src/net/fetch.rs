//! Blocking HTTP client with per-request timeout and retry.

use reqwest::blocking::Client;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Network failure, classified for the retry predicate.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },

    /// Connection, DNS, TLS or timeout failure.
    #[error("Failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    /// Body was not the expected JSON.
    #[error("Invalid response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// Client errors (4xx) and decode failures will not change on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => !(400..500).contains(status),
            FetchError::Transport { .. } => true,
            FetchError::Decode { .. } => false,
        }
    }
}

/// Outcome of a HEAD probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadResponse {
    pub status: u16,
    pub latency: Duration,
}

/// Fetches feeds and probes endpoints over HTTP/HTTPS.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with the default 10-second timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(10))
    }

    /// Create a fetcher with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("node-doctor/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            timeout,
        }
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET a URL and return the body.
    pub fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().map_err(|e| transport(url, e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response.text().map_err(|e| transport(url, e))
    }

    /// GET a URL and decode the body as JSON.
    pub fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.get_text(url)?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Send a HEAD request and measure round-trip latency.
    ///
    /// Any status is returned as data; only transport failures are errors.
    pub fn head(&self, url: &str) -> Result<HeadResponse, FetchError> {
        let start = Instant::now();
        let response = self.client.head(url).send().map_err(|e| transport(url, e))?;
        Ok(HeadResponse {
            status: response.status().as_u16(),
            latency: start.elapsed(),
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn transport(url: &str, e: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}

/// Exponential-backoff retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before attempt `attempt` (1-based; the first attempt has none).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        self.base_delay * 2u32.saturating_pow(attempt - 2)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out. Returns the last error.
    pub fn run<T>(&self, mut op: impl FnMut() -> Result<T, FetchError>) -> Result<T, FetchError> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts.max(1) => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    tracing::debug!("{}; retrying in {:?} (attempt {})", e, delay, attempt);
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
