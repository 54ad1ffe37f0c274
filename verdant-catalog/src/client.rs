//! Catalog client façade
//!
//! Combines rate limiting, TTL caching, retry/backoff, and normalization
//! into the three lookup operations callers actually use. Failures never
//! escape the public methods: every error path degrades to an absent or
//! empty result plus a log line.

use crate::cache::TtlCache;
use crate::config::CatalogConfig;
use crate::mapper;
use crate::rate_limit::RateLimiter;
use crate::response::RawCatalogResponse;
use reqwest::{header, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};
use verdant_core::{CatalogError, CatalogResult, CultivarRecord};

/// Cached outcome of one catalog operation, keyed by operation + parameters.
///
/// Only catalog answers are cached; exhausted retries are not, so the next
/// call goes back to the network.
#[derive(Debug, Clone)]
enum CachedLookup {
    Single(Option<CultivarRecord>),
    Many(Vec<CultivarRecord>),
}

/// Client for the external strain catalog.
///
/// Construct once per process with an explicit [`CatalogConfig`] and share
/// it; all internal state is mutex-guarded and all sleeps happen outside any
/// lock, so one caller's backoff never blocks another caller's lookups.
pub struct CatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
    rate_limiter: RateLimiter,
    cache: TtlCache<CachedLookup>,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Self {
        let rate_limiter = RateLimiter::new(config.max_requests, config.time_window);
        let cache = TtlCache::new(config.cache_ttl, config.cache_max_size);
        CatalogClient {
            http: reqwest::Client::new(),
            config,
            rate_limiter,
            cache,
        }
    }

    /// Fetch one cultivar by name.
    ///
    /// Selects the case-insensitive exact name match from the catalog's
    /// answer, falling back to the first record. Returns `None` for blank
    /// input, a record without a usable id, or any unrecovered failure.
    pub async fn fetch_by_name(&self, name: &str) -> Option<CultivarRecord> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let key = cache_key("fetch_by_name", &[("name", name)]);
        if let Some(CachedLookup::Single(cached)) = self.cache.get(&key) {
            debug!(key = %key, "Catalog cache hit");
            return cached;
        }

        let records = match self.request_with_retry(&[("name", name)]).await {
            Ok(records) => records,
            Err(_) => return None,
        };

        let normalized = select_by_name(records, name).and_then(|raw| {
            let mapped = mapper::map_strain(&raw);
            if mapped.is_none() {
                warn!(name, "Catalog record for name lookup has no usable id/name");
            }
            mapped
        });

        self.cache.set(key, CachedLookup::Single(normalized.clone()));
        normalized
    }

    /// Search cultivars by strain type (e.g. "indica").
    pub async fn search_by_type(&self, strain_type: &str) -> Vec<CultivarRecord> {
        self.search("search_by_type", "type", strain_type).await
    }

    /// Search cultivars by reported effect (e.g. "relaxed").
    pub async fn search_by_effect(&self, effect: &str) -> Vec<CultivarRecord> {
        self.search("search_by_effect", "effect", effect).await
    }

    /// Drop all cached lookups.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn search(&self, operation: &str, param: &str, value: &str) -> Vec<CultivarRecord> {
        let value = value.trim();
        if value.is_empty() {
            return Vec::new();
        }
        let key = cache_key(operation, &[(param, value)]);
        if let Some(CachedLookup::Many(cached)) = self.cache.get(&key) {
            debug!(key = %key, "Catalog cache hit");
            return cached;
        }

        let records = match self.request_with_retry(&[(param, value)]).await {
            Ok(records) => records,
            Err(_) => return Vec::new(),
        };

        let normalized: Vec<CultivarRecord> = records
            .iter()
            .filter_map(|raw| {
                let mapped = mapper::map_strain(raw);
                if mapped.is_none() {
                    warn!(operation, "Skipping catalog record without usable id/name");
                }
                mapped
            })
            .collect();

        self.cache.set(key, CachedLookup::Many(normalized.clone()));
        normalized
    }

    /// Run the retry state machine around single attempts.
    ///
    /// Rate limiting is applied before every attempt. Retryable failures
    /// back off on the schedule in [`RetryPolicy`](crate::RetryPolicy);
    /// fatal failures and budget exhaustion are logged here so callers can
    /// stay silent.
    async fn request_with_retry(&self, params: &[(&str, &str)]) -> CatalogResult<Vec<Value>> {
        let url = format!("{}/strains", self.config.base_url);
        let total_attempts = self.config.retry.max_retries + 1;
        let mut attempt: u32 = 0;

        loop {
            self.rate_limiter.wait_if_needed().await;

            let err = match self.attempt(&url, params).await {
                Ok(records) => {
                    if attempt > 0 {
                        debug!(url = %url, attempt = attempt + 1, "Catalog request succeeded after retries");
                    }
                    return Ok(records);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                error!(url = %url, attempt = attempt + 1, error = %err, "Catalog request failed; not retrying");
                return Err(err);
            }
            if attempt + 1 >= total_attempts {
                error!(
                    url = %url,
                    attempts = total_attempts,
                    error = %err,
                    "Catalog retry budget exhausted"
                );
                return Err(err);
            }

            let delay = self.config.retry.delay_for(attempt, &err);
            warn!(
                url = %url,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retryable catalog failure, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// One transport attempt: GET, classify the status, parse the body.
    async fn attempt(&self, url: &str, params: &[(&str, &str)]) -> CatalogResult<Vec<Value>> {
        let mut request = self
            .http
            .get(url)
            .query(params)
            .header(header::USER_AGENT, &self.config.user_agent)
            .header(header::ACCEPT, "application/json")
            .timeout(self.config.request_timeout);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                CatalogError::Timeout { url: url.to_string() }
            } else {
                CatalogError::Network {
                    url: url.to_string(),
                    message: err.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited { url: url.to_string() });
        }
        if status.is_server_error() {
            return Err(CatalogError::Server {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if status.is_client_error() {
            return Err(CatalogError::Client {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(CatalogError::InvalidResponse {
                url: url.to_string(),
                reason: format!("unexpected status {}", status),
            });
        }

        let body: RawCatalogResponse =
            response
                .json()
                .await
                .map_err(|err| CatalogError::InvalidResponse {
                    url: url.to_string(),
                    reason: err.to_string(),
                })?;
        Ok(body.into_records())
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.config.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Deterministic cache key: operation name plus sorted `key=value` pairs.
fn cache_key(operation: &str, params: &[(&str, &str)]) -> String {
    let mut pairs: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    pairs.sort();
    format!("{}:{}", operation, pairs.join("&"))
}

/// Pick the case-insensitive exact name match, else the first record.
fn select_by_name(records: Vec<Value>, name: &str) -> Option<Value> {
    let target = name.to_lowercase();
    let exact = records.iter().position(|record| {
        record
            .get("name")
            .and_then(Value::as_str)
            .map(|candidate| candidate.to_lowercase() == target)
            .unwrap_or(false)
    });
    match exact {
        Some(index) => records.into_iter().nth(index),
        None => records.into_iter().next(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
