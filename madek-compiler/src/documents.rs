//! Madek API response types
//!
//! Only the fields the compiler reads are modelled. Missing fields default to
//! empty values so that sparse documents still parse; required relations are
//! checked where they are followed.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

/// Parse a response body into a typed document
pub(crate) fn parse<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::InvalidDocument {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Strict RFC 3339 parsing of `created_at`
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::TimestampParseFailure {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// `_json-roa` envelope
#[derive(Debug, Default, Deserialize)]
pub(crate) struct JsonRoa {
    #[serde(default)]
    pub relations: HashMap<String, Relation>,
    #[serde(default)]
    pub collection: Option<RoaCollection>,
}

impl JsonRoa {
    pub fn relation_href(&self, name: &str) -> Option<&str> {
        self.relations
            .get(name)
            .map(|r| r.href.as_str())
            .filter(|href| !href.is_empty())
    }

    /// A null `next` counts as absent
    pub fn has_next_page(&self) -> bool {
        self.collection
            .as_ref()
            .is_some_and(|c| c.next.as_ref().is_some_and(|next| !next.is_null()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Relation {
    #[serde(default)]
    pub href: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RoaCollection {
    #[serde(default)]
    pub next: Option<serde_json::Value>,
}

/// `{ "id": ... }` element of an id list
#[derive(Debug, Deserialize)]
pub(crate) struct IdRef {
    #[serde(default)]
    pub id: String,
}

/// `/api/collections/{id}` and `/api/media-entries/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceDocument {
    #[serde(default)]
    pub created_at: String,
    #[serde(rename = "_json-roa", default)]
    pub roa: JsonRoa,
}

/// `/api/media-entries/?collection_id={id}&page={n}`
#[derive(Debug, Deserialize)]
pub(crate) struct MediaEntriesPage {
    #[serde(rename = "media-entries", default)]
    pub media_entries: Vec<IdRef>,
    #[serde(rename = "_json-roa", default)]
    pub roa: JsonRoa,
}

/// `/api/media-files/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct MediaFileDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub previews: Option<Vec<IdRef>>,
    #[serde(rename = "_json-roa", default)]
    pub roa: JsonRoa,
}

/// `/api/previews/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct PreviewDocument {
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// `/api/{collections,media-entries}/{id}/meta-data/`
#[derive(Debug, Deserialize)]
pub(crate) struct MetaDataListing {
    #[serde(rename = "meta-data", default)]
    pub meta_data: Vec<MetaDataListingEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetaDataListingEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub meta_key_id: String,
}

/// `/api/meta-data/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct MetaDatumDocument {
    #[serde(rename = "type", default)]
    pub datum_type: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl MetaDatumDocument {
    /// String value of a text metadatum; non-strings read as empty
    pub fn text(&self) -> String {
        self.value.as_str().unwrap_or_default().to_string()
    }

    /// Referenced ids of a list metadatum, in source order
    pub fn ids(&self) -> Vec<String> {
        self.value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("id").and_then(|id| id.as_str()))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// `/api/people/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct PersonDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub pseudonym: Option<String>,
}

/// `/api/keywords/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct KeywordDocument {
    #[serde(default)]
    pub term: String,
}

/// `/api/licenses/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct LicenseDocument {
    #[serde(default)]
    pub label: String,
}
