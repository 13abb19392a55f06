//! HTTP transport backed by reqwest

use super::{classify_status, Transport, JSON_ROA};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, info};

/// Basic-auth credentials
#[derive(Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// Production transport: one reqwest GET per fetch
///
/// Sends `Accept: application/json-roa+json` and, when configured, HTTP basic
/// authentication. There are no retries; a timeout applies only when one was
/// set on the builder.
///
/// # Example
/// ```rust,ignore
/// use madek_compiler::transport::HttpTransport;
/// use std::time::Duration;
///
/// let transport = HttpTransport::builder()
///     .credentials("user", "secret")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct HttpTransport {
    client: Client,
    credentials: Option<Credentials>,
    log_requests: bool,
}

impl HttpTransport {
    /// Anonymous transport with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }
}

/// Builder for [`HttpTransport`]
#[derive(Default)]
pub struct HttpTransportBuilder {
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
    log_requests: bool,
}

impl HttpTransportBuilder {
    /// Authenticate every request with HTTP basic auth
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Total timeout per request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Log every request URL at info level instead of debug
    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn build(self) -> Result<HttpTransport> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(JSON_ROA));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| Error::TransportFailure {
            url: String::new(),
            reason: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(HttpTransport {
            client,
            credentials: self.credentials,
            log_requests: self.log_requests,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String> {
        if self.log_requests {
            info!(url = %url, "GET");
        } else {
            debug!(url = %url, "GET");
        }

        let mut request = self.client.get(url);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await.map_err(|e| Error::TransportFailure {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::TransportFailure {
            url: url.to_string(),
            reason: format!("failed to read body: {}", e),
        })?;

        classify_status(status, url)?;
        Ok(body)
    }
}
