//! Entity reference resolution through the session cache

use crate::cache::{Reference, ReferenceKind};
use crate::client::{Client, Fetcher};
use crate::documents::{KeywordDocument, LicenseDocument, PersonDocument};
use crate::error::{Error, Result};
use madek_common::models::{Author, Group};
use tracing::debug;

impl Client {
    /// Resolve an entity reference, fetching it at most once per session
    ///
    /// Authors and groups are both stored as people by the API; groups take
    /// their name from `last_name`.
    pub async fn resolve(&self, kind: ReferenceKind, id: &str) -> Result<Reference> {
        let fetcher = self.fetcher();
        let owned_id = id.to_string();
        self.cache()
            .get_or_load(kind, id, move || async move {
                load_reference(&fetcher, kind, &owned_id).await
            })
            .await
    }

    pub async fn resolve_author(&self, id: &str) -> Result<Author> {
        match self.resolve(ReferenceKind::Author, id).await? {
            Reference::Author(author) => Ok(author),
            other => Err(kind_mismatch(ReferenceKind::Author, &other)),
        }
    }

    pub async fn resolve_group(&self, id: &str) -> Result<Group> {
        match self.resolve(ReferenceKind::Group, id).await? {
            Reference::Group(group) => Ok(group),
            other => Err(kind_mismatch(ReferenceKind::Group, &other)),
        }
    }

    /// Keyword term
    pub async fn resolve_keyword(&self, id: &str) -> Result<String> {
        match self.resolve(ReferenceKind::Keyword, id).await? {
            Reference::Keyword(term) => Ok(term),
            other => Err(kind_mismatch(ReferenceKind::Keyword, &other)),
        }
    }

    /// License label
    pub async fn resolve_license(&self, id: &str) -> Result<String> {
        match self.resolve(ReferenceKind::License, id).await? {
            Reference::License(label) => Ok(label),
            other => Err(kind_mismatch(ReferenceKind::License, &other)),
        }
    }
}

async fn load_reference(fetcher: &Fetcher, kind: ReferenceKind, id: &str) -> Result<Reference> {
    debug!(kind = %kind, id = %id, "Resolving reference");

    let reference = match kind {
        ReferenceKind::Author => {
            let person: PersonDocument = fetcher
                .fetch_document(&fetcher.url(&format!("/api/people/{}", id)))
                .await?;
            Reference::Author(Author {
                id: person.id,
                first_name: person.first_name.unwrap_or_default(),
                last_name: person.last_name.unwrap_or_default(),
            })
        }
        ReferenceKind::Group => {
            let person: PersonDocument = fetcher
                .fetch_document(&fetcher.url(&format!("/api/people/{}", id)))
                .await?;
            Reference::Group(Group {
                id: person.id,
                name: person.last_name.unwrap_or_default(),
                pseudonym: person.pseudonym.unwrap_or_default(),
            })
        }
        ReferenceKind::Keyword => {
            let keyword: KeywordDocument = fetcher
                .fetch_document(&fetcher.url(&format!("/api/keywords/{}", id)))
                .await?;
            Reference::Keyword(keyword.term)
        }
        ReferenceKind::License => {
            let license: LicenseDocument = fetcher
                .fetch_document(&fetcher.url(&format!("/api/licenses/{}", id)))
                .await?;
            Reference::License(license.label)
        }
    };

    Ok(reference)
}

fn kind_mismatch(expected: ReferenceKind, found: &Reference) -> Error {
    Error::Internal(format!(
        "reference cache returned a {} where a {} was expected",
        found.kind(),
        expected
    ))
}
