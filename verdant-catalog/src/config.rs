//! Client configuration

use std::fmt;
use std::time::Duration;
use verdant_core::CatalogError;

/// Default catalog API root.
pub const DEFAULT_BASE_URL: &str = "https://api.cannabis-catalog.io/v1";

/// Backoff schedule for the retry pipeline.
///
/// Rate-limit (429) responses use their own capped exponential schedule;
/// server/network failures use the plain exponential schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = max_retries + 1).
    pub max_retries: u32,
    /// Base delay for server/network failures, doubled per attempt.
    pub backoff_base: Duration,
    /// Base delay for 429 responses, doubled per attempt.
    pub rate_limit_base: Duration,
    /// Ceiling on the 429 schedule.
    pub rate_limit_cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            backoff_base: Duration::from_millis(500),
            rate_limit_base: Duration::from_secs(1),
            rate_limit_cap: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following the given zero-based attempt.
    pub fn delay_for(&self, attempt: u32, error: &CatalogError) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        if error.is_rate_limit() {
            self.rate_limit_base
                .saturating_mul(factor)
                .min(self.rate_limit_cap)
        } else {
            self.backoff_base.saturating_mul(factor)
        }
    }
}

/// Configuration for [`CatalogClient`](crate::CatalogClient).
///
/// All knobs are injected here; the client keeps no global state.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Catalog API root, without a trailing slash.
    pub base_url: String,
    /// Optional bearer token for the catalog.
    pub api_key: Option<String>,
    pub user_agent: String,
    /// Per-attempt HTTP timeout.
    pub request_timeout: Duration,
    /// Admission ceiling: at most `max_requests` per `time_window`.
    pub max_requests: usize,
    pub time_window: Duration,
    pub cache_ttl: Duration,
    pub cache_max_size: usize,
    pub retry: RetryPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_agent: format!("verdant/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: Duration::from_secs(30),
            max_requests: 60,
            time_window: Duration::from_secs(60),
            cache_ttl: Duration::from_secs(300),
            cache_max_size: 128,
            retry: RetryPolicy::default(),
        }
    }
}

impl CatalogConfig {
    /// Override the catalog root (tests point this at a mock server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, max_requests: usize, time_window: Duration) -> Self {
        self.max_requests = max_requests;
        self.time_window = time_window;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, ttl: Duration, max_size: usize) -> Self {
        self.cache_ttl = ttl;
        self.cache_max_size = max_size;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .field("max_requests", &self.max_requests)
            .field("time_window", &self.time_window)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_max_size", &self.cache_max_size)
            .field("retry", &self.retry)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
