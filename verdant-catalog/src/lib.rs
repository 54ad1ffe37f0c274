//! VERDANT Catalog - Strain Catalog Ingestion
//!
//! Client for a third-party cannabis-strain catalog API. Normalizes raw
//! catalog records into the application's cultivar/breeder shapes and shields
//! callers from the catalog's unreliability (rate limits, transient 5xx
//! errors, timeouts) with a sliding-window rate limiter, a bounded TTL cache,
//! and a retry/backoff pipeline.
//!
//! Construct one [`CatalogClient`] per process and share it; every operation
//! is safe to call from any number of tasks concurrently.

pub mod cache;
pub mod client;
pub mod config;
pub mod mapper;
pub mod rate_limit;
pub mod response;

pub use cache::TtlCache;
pub use client::CatalogClient;
pub use config::{CatalogConfig, RetryPolicy, DEFAULT_BASE_URL};
pub use rate_limit::RateLimiter;
pub use response::RawCatalogResponse;
