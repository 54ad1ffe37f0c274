//! Error types for catalog ingestion

use thiserror::Error;

/// Errors produced while talking to the external strain catalog.
///
/// The variants carry enough context (URL, status) for a postmortem log line.
/// The API key is never part of any error value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Rate limited by catalog at {url}")]
    RateLimited { url: String },

    #[error("Catalog server error {status} from {url}")]
    Server { url: String, status: u16 },

    #[error("Catalog client error {status} from {url}")]
    Client { url: String, status: u16 },

    #[error("Catalog request to {url} timed out")]
    Timeout { url: String },

    #[error("Network error reaching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
}

impl CatalogError {
    /// Whether the retry loop may attempt this request again.
    ///
    /// Server errors, timeouts, and network failures are transient; rate
    /// limiting is recoverable on its own (slower) schedule. Client errors
    /// and malformed bodies will not improve on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::RateLimited { .. }
                | CatalogError::Server { .. }
                | CatalogError::Timeout { .. }
                | CatalogError::Network { .. }
        )
    }

    /// Whether this is a 429 rate-limit signal (uses the capped schedule).
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, CatalogError::RateLimited { .. })
    }

    /// The URL the failed request targeted.
    pub fn url(&self) -> &str {
        match self {
            CatalogError::RateLimited { url }
            | CatalogError::Server { url, .. }
            | CatalogError::Client { url, .. }
            | CatalogError::Timeout { url }
            | CatalogError::Network { url, .. }
            | CatalogError::InvalidResponse { url, .. } => url,
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = CatalogError::Server {
            url: "https://catalog.example/strains".to_string(),
            status: 503,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("server error"));
        assert!(msg.contains("503"));
        assert!(msg.contains("https://catalog.example/strains"));
    }

    #[test]
    fn test_client_error_display() {
        let err = CatalogError::Client {
            url: "https://catalog.example/strains".to_string(),
            status: 404,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("client error"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn test_retryable_classification() {
        let url = "https://catalog.example/strains".to_string();
        assert!(CatalogError::RateLimited { url: url.clone() }.is_retryable());
        assert!(CatalogError::Server {
            url: url.clone(),
            status: 500
        }
        .is_retryable());
        assert!(CatalogError::Timeout { url: url.clone() }.is_retryable());
        assert!(CatalogError::Network {
            url: url.clone(),
            message: "connection reset".to_string()
        }
        .is_retryable());
        assert!(!CatalogError::Client {
            url: url.clone(),
            status: 400
        }
        .is_retryable());
        assert!(!CatalogError::InvalidResponse {
            url,
            reason: "not json".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_rate_limit_classification() {
        let url = "https://catalog.example/strains".to_string();
        assert!(CatalogError::RateLimited { url: url.clone() }.is_rate_limit());
        assert!(!CatalogError::Server { url, status: 500 }.is_rate_limit());
    }

    #[test]
    fn test_url_accessor() {
        let err = CatalogError::Timeout {
            url: "https://catalog.example/strains?name=og".to_string(),
        };
        assert_eq!(err.url(), "https://catalog.example/strains?name=og");
    }
}
