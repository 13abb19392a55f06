use super::{MediaEntry, Metadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A collection groups many media entries under its own metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub meta_data: Metadata,
    /// Member media entries, one per id discovered across all pages
    pub media_entries: Vec<MediaEntry>,
}

impl Collection {
    /// Ids of all member media entries
    pub fn media_entry_ids(&self) -> impl Iterator<Item = &str> {
        self.media_entries.iter().map(|entry| entry.id.as_str())
    }
}
