//! Compilation session
//!
//! A [`Client`] ties together the API address, the [`Transport`], the
//! [`ReferenceCache`] and the compilation options. The compilers are
//! implemented as methods on `Client` in their own modules:
//! - [`compile_collection`](Client::compile_collection) (`collection.rs`)
//! - [`compile_media_entry`](Client::compile_media_entry) (`media_entry.rs`)
//! - [`compile_metadata`](Client::compile_metadata) (`metadata.rs`)
//! - [`resolve`](Client::resolve) and typed helpers (`references.rs`)

use crate::cache::ReferenceCache;
use crate::documents;
use crate::error::Result;
use crate::metadata::SUPPORTED_META_KEYS;
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// A Madek API session
///
/// Cheap to clone: clones share the transport and the reference cache, which
/// is what lets compilation tasks run on their own tokio tasks.
///
/// # Example
/// ```rust,ignore
/// use madek_compiler::{Client, transport::HttpTransport};
/// use std::sync::Arc;
///
/// let transport = HttpTransport::builder().credentials("user", "secret").build()?;
/// let client = Client::new("https://medienarchiv.zhdk.ch", Arc::new(transport));
/// let collection = client.compile_collection("82108639-c4a6-412d-b347-341fe5284caa").await?;
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    fetcher: Fetcher,
    cache: ReferenceCache,
    supported_keys: HashSet<String>,
    max_pages: Option<u32>,
}

impl Client {
    /// Client with the default supported meta keys and unbounded pagination
    pub fn new(address: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self::builder(address, transport).build()
    }

    pub fn builder(address: impl Into<String>, transport: Arc<dyn Transport>) -> ClientBuilder {
        ClientBuilder {
            address: address.into(),
            transport,
            extra_keys: Vec::new(),
            max_pages: None,
        }
    }

    /// Base address without trailing slash
    pub fn address(&self) -> &str {
        &self.inner.fetcher.address
    }

    /// Append `path` to the base address
    pub fn url(&self, path: &str) -> String {
        self.inner.fetcher.url(path)
    }

    /// The session's reference cache
    pub fn cache(&self) -> &ReferenceCache {
        &self.inner.cache
    }

    /// Whether metadata under `key` is compiled or silently skipped
    pub fn is_supported_key(&self, key: &str) -> bool {
        self.inner.supported_keys.contains(key)
    }

    pub fn max_pages(&self) -> Option<u32> {
        self.inner.max_pages
    }

    /// Fetch `url` and parse the body as a typed document
    pub(crate) async fn fetch_document<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.inner.fetcher.fetch_document(url).await
    }

    /// Address and transport, detached from the session
    pub(crate) fn fetcher(&self) -> Fetcher {
        self.inner.fetcher.clone()
    }
}

/// Everything a single fetch needs
///
/// Lookups stored in the reference cache hold a `Fetcher` rather than a
/// `Client`, so a pending lookup never keeps its own session alive.
#[derive(Clone)]
pub(crate) struct Fetcher {
    address: String,
    transport: Arc<dyn Transport>,
}

impl Fetcher {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn fetch_document<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.transport.fetch(url).await?;
        debug!(url = %url, bytes = body.len(), "Fetched document");
        documents::parse(url, &body)
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    address: String,
    transport: Arc<dyn Transport>,
    extra_keys: Vec<String>,
    max_pages: Option<u32>,
}

impl ClientBuilder {
    /// Admit an additional meta key past the allow-list filter
    ///
    /// The key still has to map to a field for its metadatum type, otherwise
    /// compilation fails with an unhandled metadatum error.
    pub fn supported_key(mut self, key: impl Into<String>) -> Self {
        self.extra_keys.push(key.into());
        self
    }

    /// Fail collection compilation once more than `pages` pages were fetched
    pub fn max_pages(mut self, pages: Option<u32>) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn build(self) -> Client {
        let supported_keys = SUPPORTED_META_KEYS
            .iter()
            .map(|key| key.to_string())
            .chain(self.extra_keys)
            .collect();

        Client {
            inner: Arc::new(ClientInner {
                fetcher: Fetcher {
                    address: self.address.trim_end_matches('/').to_string(),
                    transport: self.transport,
                },
                cache: ReferenceCache::new(),
                supported_keys,
                max_pages: self.max_pages,
            }),
        }
    }
}
