//! Media-Entry Compiler

use crate::client::Client;
use crate::documents::{self, MediaFileDocument, PreviewDocument, ResourceDocument};
use crate::error::{Error, Result};
use crate::fanout::join_all_tasks;
use madek_common::models::{MediaEntry, Preview};
use tracing::debug;

impl Client {
    /// Compile one media entry with its metadata, file and previews
    ///
    /// The metadata pass and the file descriptor are fetched concurrently;
    /// both run to completion before either outcome is inspected.
    ///
    /// # Errors
    /// - [`Error::TimestampParseFailure`] for a malformed `created_at`
    /// - [`Error::InvalidDocument`] when the entry has no media-file relation
    /// - The first error of the metadata pass, the file or any preview
    pub async fn compile_media_entry(&self, id: &str) -> Result<MediaEntry> {
        let entry_url = self.url(&format!("/api/media-entries/{}", id));
        let document: ResourceDocument = self.fetch_document(&entry_url).await?;
        let created_at = documents::parse_timestamp(&document.created_at)?;

        let meta_data_url = self.url(&format!("/api/media-entries/{}/meta-data/", id));
        let (meta_data, file) = tokio::join!(
            self.compile_metadata(&meta_data_url),
            self.fetch_media_file(&entry_url, &document)
        );
        let meta_data = meta_data?;
        let file = file?;

        let stream_url = file
            .roa
            .relation_href("data-stream")
            .map(|href| self.url(href))
            .unwrap_or_default();
        let download_url = self.url(&format!("/files/{}", file.id));

        let preview_ids: Vec<String> = file
            .previews
            .unwrap_or_default()
            .into_iter()
            .map(|preview| preview.id)
            .collect();
        let previews = join_all_tasks(preview_ids.into_iter().map(|preview_id| {
            let client = self.clone();
            async move { client.compile_preview(&preview_id).await }
        }))
        .await?;

        debug!(id = %id, file = %file.filename, previews = previews.len(), "Compiled media entry");

        Ok(MediaEntry {
            id: id.to_string(),
            created_at,
            meta_data,
            file_id: file.id,
            file_name: file.filename,
            stream_url,
            download_url,
            previews,
        })
    }

    async fn fetch_media_file(
        &self,
        entry_url: &str,
        document: &ResourceDocument,
    ) -> Result<MediaFileDocument> {
        let href = document
            .roa
            .relation_href("media-file")
            .ok_or_else(|| Error::InvalidDocument {
                url: entry_url.to_string(),
                reason: "missing media-file relation".to_string(),
            })?;
        self.fetch_document(&self.url(href)).await
    }

    async fn compile_preview(&self, id: &str) -> Result<Preview> {
        let document: PreviewDocument = self
            .fetch_document(&self.url(&format!("/api/previews/{}", id)))
            .await?;

        Ok(Preview {
            id: id.to_string(),
            media_type: document.media_type,
            content_type: document.content_type,
            size: document.thumbnail,
            width: document.width.unwrap_or_default(),
            height: document.height.unwrap_or_default(),
            url: self.url(&format!("/media/{}", id)),
        })
    }
}
