//! Transport layer
//!
//! A [`Transport`] performs one authenticated GET and hands back the raw body
//! text, or a classified [`Error`]. The compiler never talks HTTP directly;
//! everything goes through this seam so tests can substitute
//! [`MockTransport`].

mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use self::http::{HttpTransport, HttpTransportBuilder};
#[cfg(any(test, feature = "test-utils"))]
pub use self::mock::MockTransport;

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;

/// Media type requested from the Madek API
pub const JSON_ROA: &str = "application/json-roa+json";

/// Fetches one URL from the API
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the body of a successful response
    ///
    /// # Errors
    /// - [`Error::InvalidAuthentication`] for 401
    /// - [`Error::AccessForbidden`] for 403
    /// - [`Error::NotFound`] for 404
    /// - [`Error::RequestFailed`] for any other non-2xx status
    /// - [`Error::TransportFailure`] when no response could be read
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Map a response status to the compiler's error taxonomy
pub fn classify_status(status: StatusCode, url: &str) -> Result<()> {
    let url = url.to_string();
    match status {
        StatusCode::UNAUTHORIZED => Err(Error::InvalidAuthentication { url }),
        StatusCode::FORBIDDEN => Err(Error::AccessForbidden { url }),
        StatusCode::NOT_FOUND => Err(Error::NotFound { url }),
        status if status.is_success() => Ok(()),
        status => Err(Error::RequestFailed {
            url,
            status: status.as_u16(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://madek.test/api/collections/1";

    #[test]
    fn test_classify_success() {
        assert!(classify_status(StatusCode::OK, URL).is_ok());
        assert!(classify_status(StatusCode::NO_CONTENT, URL).is_ok());
    }

    #[test]
    fn test_classify_known_failures() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, URL),
            Err(Error::InvalidAuthentication { url: URL.to_string() })
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, URL),
            Err(Error::AccessForbidden { url: URL.to_string() })
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, URL),
            Err(Error::NotFound { url: URL.to_string() })
        );
    }

    #[test]
    fn test_classify_other_status() {
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, URL),
            Err(Error::RequestFailed {
                url: URL.to_string(),
                status: 500
            })
        );
        // Redirects are not followed into success
        assert!(matches!(
            classify_status(StatusCode::MOVED_PERMANENTLY, URL),
            Err(Error::RequestFailed { status: 301, .. })
        ));
    }
}
