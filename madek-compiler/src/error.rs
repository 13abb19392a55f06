//! Error types for madek-compiler
//!
//! Every error raised by a fetch or parse step aborts its parent compilation
//! and travels unchanged through each fan-in up to the caller. Errors are
//! `Clone` so that concurrent callers waiting on one shared reference lookup
//! can all observe the same failure.

use thiserror::Error;

/// Result type for compilation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Compilation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The API rejected the supplied credentials (401)
    #[error("invalid authentication: {url}")]
    InvalidAuthentication { url: String },

    /// The requested resource is protected (403)
    #[error("access forbidden: {url}")]
    AccessForbidden { url: String },

    /// The requested resource does not exist (404)
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Any other non-success status
    #[error("request failed with status {status}: {url}")]
    RequestFailed { url: String, status: u16 },

    /// Network or I/O failure before a status was available
    #[error("transport failure for {url}: {reason}")]
    TransportFailure { url: String, reason: String },

    /// A `created_at` value is not valid RFC 3339
    #[error("failed to parse timestamp {value:?}: {reason}")]
    TimestampParseFailure { value: String, reason: String },

    /// A supported meta key carries a metadatum type the compiler does not know
    #[error("unhandled meta datum type: {datum_type}: {key}")]
    UnhandledMetadatumType { datum_type: String, key: String },

    /// A known metadatum type appears under a key it cannot be mapped from
    #[error("unhandled meta datum key: {datum_type}: {key}")]
    UnhandledMetadatumKey { datum_type: String, key: String },

    /// A response body is not the JSON document expected at this URL
    #[error("invalid document at {url}: {reason}")]
    InvalidDocument { url: String, reason: String },

    /// Collection pagination ran past the configured page limit
    #[error("collection {collection_id} exceeded the page limit of {pages}")]
    PaginationLimitExceeded { collection_id: String, pages: u32 },

    /// A worker task panicked
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns `true` if retrying might succeed.
    ///
    /// The compiler itself never retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TransportFailure { .. } => true,
            Self::RequestFailed { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` for the two authentication related failures
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::InvalidAuthentication { .. } | Self::AccessForbidden { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_type_and_key() {
        let err = Error::UnhandledMetadatumKey {
            datum_type: "MetaDatum::Text".to_string(),
            key: "madek_core:unknown_field".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unhandled meta datum key: MetaDatum::Text: madek_core:unknown_field"
        );
    }

    #[test]
    fn test_retryable() {
        let url = "https://madek.test/api/previews/1".to_string();
        assert!(Error::TransportFailure {
            url: url.clone(),
            reason: "reset".to_string()
        }
        .is_retryable());
        assert!(Error::RequestFailed { url: url.clone(), status: 503 }.is_retryable());
        assert!(!Error::RequestFailed { url: url.clone(), status: 400 }.is_retryable());
        assert!(!Error::NotFound { url }.is_retryable());
    }

    #[test]
    fn test_is_auth() {
        let url = "https://madek.test/api/collections/1".to_string();
        assert!(Error::InvalidAuthentication { url: url.clone() }.is_auth());
        assert!(Error::AccessForbidden { url: url.clone() }.is_auth());
        assert!(!Error::NotFound { url }.is_auth());
    }
}
