//! Collection Compiler
//!
//! Compiles a collection's own metadata while walking the paginated list of
//! member media entries, then compiles every member concurrently. The first
//! failure anywhere aborts the whole collection; there is no partial result.

use crate::client::Client;
use crate::documents::{self, MediaEntriesPage, ResourceDocument};
use crate::error::{Error, Result};
use crate::fanout::join_all_tasks;
use madek_common::models::Collection;
use std::time::Instant;
use tracing::{debug, info};

impl Client {
    /// Compile a collection with all of its media entries
    ///
    /// # Errors
    /// - [`Error::TimestampParseFailure`] for a malformed `created_at`
    /// - [`Error::PaginationLimitExceeded`] when a page limit is configured
    ///   and the listing has more pages
    /// - The first error of the metadata pass, the listing or any entry
    pub async fn compile_collection(&self, id: &str) -> Result<Collection> {
        let started = Instant::now();

        let document: ResourceDocument = self
            .fetch_document(&self.url(&format!("/api/collections/{}", id)))
            .await?;
        let created_at = documents::parse_timestamp(&document.created_at)?;

        let meta_data_url = self.url(&format!("/api/collections/{}/meta-data/", id));
        let (meta_data, entry_ids) = tokio::join!(
            self.compile_metadata(&meta_data_url),
            self.media_entry_ids(id)
        );
        let meta_data = meta_data?;
        let entry_ids = entry_ids?;

        debug!(collection = %id, entries = entry_ids.len(), "Compiling media entries");

        let media_entries = join_all_tasks(entry_ids.into_iter().map(|entry_id| {
            let client = self.clone();
            async move { client.compile_media_entry(&entry_id).await }
        }))
        .await?;

        info!(
            collection = %id,
            entries = media_entries.len(),
            cached_references = self.cache().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Compiled collection"
        );

        Ok(Collection {
            id: id.to_string(),
            created_at,
            meta_data,
            media_entries,
        })
    }

    /// Walk the media-entry listing of collection `id` page by page
    async fn media_entry_ids(&self, id: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut page: u32 = 0;

        loop {
            if let Some(limit) = self.max_pages() {
                if page >= limit {
                    return Err(Error::PaginationLimitExceeded {
                        collection_id: id.to_string(),
                        pages: limit,
                    });
                }
            }

            let page_url = self.url(&format!(
                "/api/media-entries/?collection_id={}&page={}",
                id, page
            ));
            let listing: MediaEntriesPage = self.fetch_document(&page_url).await?;
            debug!(
                collection = %id,
                page,
                found = listing.media_entries.len(),
                "Fetched media-entry page"
            );

            ids.extend(listing.media_entries.into_iter().map(|entry| entry.id));

            if !listing.roa.has_next_page() {
                return Ok(ids);
            }
            page += 1;
        }
    }
}
