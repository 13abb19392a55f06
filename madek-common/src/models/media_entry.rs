use super::Metadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One media asset: metadata, backing file and its preview renditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub meta_data: Metadata,
    pub file_id: String,
    pub file_name: String,
    /// Absolute URL of the API data stream for the file
    pub stream_url: String,
    /// Absolute URL of the public download (`{address}/files/{file_id}`)
    pub download_url: String,
    #[serde(default)]
    pub previews: Vec<Preview>,
}

/// A rendered variant of a media entry's file at a given size class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub id: String,
    /// Media type reported by the API (`image`, `video`, `audio`, ...)
    #[serde(rename = "type")]
    pub media_type: String,
    pub content_type: String,
    /// Size label (`small`, `medium`, `x_large`, `maximum`, ...)
    pub size: String,
    pub width: u32,
    pub height: u32,
    /// Absolute access URL (`{address}/media/{preview_id}`)
    pub url: String,
}
