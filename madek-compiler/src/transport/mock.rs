//! In-memory transport for testing
//!
//! Available in this crate's unit tests and, through the `test-utils`
//! feature, to other crates' tests.

use super::Transport;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Canned-response transport
///
/// Every URL maps to a body or an error. Unknown URLs answer
/// [`Error::NotFound`]. Each call is recorded before it is answered, so tests
/// can count fetches even for requests that failed.
///
/// # Example
/// ```rust,ignore
/// use madek_compiler::transport::mock::{fixtures, MockTransport};
///
/// let transport = MockTransport::new()
///     .with_json(fixtures::url("/api/keywords/k1"), fixtures::keyword("Design"))
///     .with_delay(fixtures::url("/api/keywords/k1"), Duration::from_millis(20));
/// ```
#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, Result<String>>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a raw body
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Ok(body.into()));
        self
    }

    /// Answer `url` with a JSON document
    pub fn with_json(self, url: impl Into<String>, document: serde_json::Value) -> Self {
        self.with_body(url, document.to_string())
    }

    /// Fail `url` with `error`
    pub fn with_error(mut self, url: impl Into<String>, error: Error) -> Self {
        self.routes.insert(url.into(), Err(error));
        self
    }

    /// Delay the answer for `url`
    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// All requested URLs, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// How often `url` was requested
    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|r| r.as_str() == url).count()
    }

    /// Total number of requests
    pub fn total_requests(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, url: &str) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        match self.routes.get(url) {
            Some(response) => response.clone(),
            None => Err(Error::NotFound { url: url.to_string() }),
        }
    }
}

/// Builders for the JSON-ROA documents served by the Madek API
pub mod fixtures {
    use serde_json::{json, Value};

    /// Base address used by fixtures
    pub const ADDRESS: &str = "https://madek.test";

    /// Absolute URL for an API path
    pub fn url(path: &str) -> String {
        format!("{}{}", ADDRESS, path)
    }

    pub fn collection(id: &str, created_at: &str) -> Value {
        json!({ "id": id, "created_at": created_at })
    }

    /// Metadata listing: `(meta datum id, meta key)` pairs
    pub fn meta_data_list(entries: &[(&str, &str)]) -> Value {
        let meta_data: Vec<Value> = entries
            .iter()
            .map(|(id, key)| json!({ "id": id, "meta_key_id": key }))
            .collect();
        json!({ "meta-data": meta_data })
    }

    /// Text-valued meta datum (`MetaDatum::Text`, `MetaDatum::TextDate`)
    pub fn meta_datum_text(datum_type: &str, value: &str) -> Value {
        json!({ "type": datum_type, "value": value })
    }

    /// Reference-list meta datum (`MetaDatum::Keywords`, `People`, `Licenses`)
    pub fn meta_datum_refs(datum_type: &str, ids: &[&str]) -> Value {
        let value: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
        json!({ "type": datum_type, "value": value })
    }

    /// One page of a collection's media entries
    pub fn media_entries_page(ids: &[&str], next: Option<&str>) -> Value {
        let entries: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
        let collection = match next {
            Some(href) => json!({ "next": { "href": href } }),
            None => json!({}),
        };
        json!({
            "media-entries": entries,
            "_json-roa": { "collection": collection }
        })
    }

    pub fn media_entry(id: &str, created_at: &str, media_file_id: &str) -> Value {
        json!({
            "id": id,
            "created_at": created_at,
            "_json-roa": {
                "relations": {
                    "media-file": { "href": format!("/api/media-files/{}", media_file_id) }
                }
            }
        })
    }

    pub fn media_file(id: &str, filename: &str, preview_ids: &[&str]) -> Value {
        let previews: Vec<Value> = preview_ids.iter().map(|id| json!({ "id": id })).collect();
        json!({
            "id": id,
            "filename": filename,
            "previews": previews,
            "_json-roa": {
                "relations": {
                    "data-stream": { "href": format!("/api/media-files/{}/data-stream", id) }
                }
            }
        })
    }

    pub fn preview(
        id: &str,
        media_type: &str,
        content_type: &str,
        size: &str,
        width: u32,
        height: u32,
    ) -> Value {
        json!({
            "id": id,
            "media_type": media_type,
            "content_type": content_type,
            "thumbnail": size,
            "width": width,
            "height": height
        })
    }

    pub fn person(id: &str, first_name: &str, last_name: &str, pseudonym: &str) -> Value {
        json!({
            "id": id,
            "first_name": first_name,
            "last_name": last_name,
            "pseudonym": pseudonym
        })
    }

    pub fn keyword(term: &str) -> Value {
        json!({ "term": term })
    }

    pub fn license(label: &str) -> Value {
        json!({ "label": label })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::url;
    use super::*;

    #[tokio::test]
    async fn test_unknown_url_is_not_found() {
        let transport = MockTransport::new();
        let err = transport.fetch(&url("/api/nothing")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(transport.total_requests(), 1);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let transport = MockTransport::new().with_body(url("/a"), "{}");
        transport.fetch(&url("/a")).await.unwrap();
        transport.fetch(&url("/a")).await.unwrap();
        assert_eq!(transport.request_count(&url("/a")), 2);
    }

    #[tokio::test]
    async fn test_canned_error() {
        let transport = MockTransport::new().with_error(
            url("/a"),
            Error::AccessForbidden { url: url("/a") },
        );
        assert!(matches!(
            transport.fetch(&url("/a")).await,
            Err(Error::AccessForbidden { .. })
        ));
    }
}
