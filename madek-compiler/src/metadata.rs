//! Metadata Compiler
//!
//! Turns the metadata listing of a collection or media entry into a
//! [`Metadata`] value:
//! 1. Fetch the listing of `{id, meta_key_id}` pairs
//! 2. Drop pairs whose key is not supported (no fetch, no error)
//! 3. Fetch every remaining metadatum on its own task
//! 4. Dispatch on `(type, key)`; entity lists resolve through the session's
//!    reference cache
//!
//! A supported key that arrives with a type or key combination the compiler
//! cannot map is a hard error: it means the API schema changed.

use crate::client::Client;
use crate::documents::{MetaDataListing, MetaDatumDocument};
use crate::error::{Error, Result};
use crate::fanout::join_all_tasks;
use madek_common::models::{Author, Group, Metadata};
use std::future::Future;
use tracing::{debug, trace};

/// Meta keys compiled by default; everything else is skipped
pub const SUPPORTED_META_KEYS: [&str; 11] = [
    "madek_core:title",
    "madek_core:subtitle",
    "madek_core:description",
    "madek_core:portrayed_object_date",
    "madek_core:copyright_notice",
    "copyright:copyright_usage",
    "madek_core:keywords",
    "media_content:type",
    "copyright:license",
    "madek_core:authors",
    "zhdk_bereich:institutional_affiliation",
];

/// Metadatum types the compiler understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetadatumType {
    Text,
    TextDate,
    Keywords,
    People,
    Licenses,
}

impl MetadatumType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "MetaDatum::Text" => Some(Self::Text),
            "MetaDatum::TextDate" => Some(Self::TextDate),
            "MetaDatum::Keywords" => Some(Self::Keywords),
            "MetaDatum::People" => Some(Self::People),
            "MetaDatum::Licenses" => Some(Self::Licenses),
            _ => None,
        }
    }
}

/// The value one metadatum contributes to [`Metadata`]
#[derive(Debug, Clone, PartialEq)]
enum Contribution {
    Title(String),
    Subtitle(String),
    Description(String),
    Year(String),
    CopyrightHolder(String),
    CopyrightUsage(String),
    Keywords(Vec<String>),
    Genres(Vec<String>),
    Licenses(Vec<String>),
    Authors(Vec<Author>),
    Affiliation(Vec<Group>),
}

impl Contribution {
    fn apply(self, metadata: &mut Metadata) {
        match self {
            Self::Title(value) => metadata.title = Some(value),
            Self::Subtitle(value) => metadata.subtitle = Some(value),
            Self::Description(value) => metadata.description = Some(value),
            Self::Year(value) => metadata.year = Some(value),
            Self::CopyrightHolder(value) => metadata.copyright.holder = Some(value),
            Self::CopyrightUsage(value) => metadata.copyright.usage = Some(value),
            Self::Keywords(terms) => metadata.keywords = terms,
            Self::Genres(terms) => metadata.genres = terms,
            Self::Licenses(labels) => metadata.copyright.licenses = labels,
            Self::Authors(authors) => metadata.authors.extend(authors),
            Self::Affiliation(groups) => metadata.affiliation.extend(groups),
        }
    }
}

/// How a metadatum's value is turned into a contribution
enum Plan {
    Text(fn(String) -> Contribution),
    KeywordTerms(fn(Vec<String>) -> Contribution),
    LicenseLabels,
    Authors,
    Affiliation,
}

/// Map `(type, key)` to a plan
fn plan(datum_type: &str, key: &str) -> Result<Plan> {
    let unhandled_key = || Error::UnhandledMetadatumKey {
        datum_type: datum_type.to_string(),
        key: key.to_string(),
    };

    let Some(parsed) = MetadatumType::parse(datum_type) else {
        return Err(Error::UnhandledMetadatumType {
            datum_type: datum_type.to_string(),
            key: key.to_string(),
        });
    };

    match parsed {
        MetadatumType::Text | MetadatumType::TextDate => match key {
            "madek_core:title" => Ok(Plan::Text(Contribution::Title)),
            "madek_core:subtitle" => Ok(Plan::Text(Contribution::Subtitle)),
            "madek_core:description" => Ok(Plan::Text(Contribution::Description)),
            "madek_core:portrayed_object_date" => Ok(Plan::Text(Contribution::Year)),
            "madek_core:copyright_notice" => Ok(Plan::Text(Contribution::CopyrightHolder)),
            "copyright:copyright_usage" => Ok(Plan::Text(Contribution::CopyrightUsage)),
            _ => Err(unhandled_key()),
        },
        MetadatumType::Keywords => match key {
            "madek_core:keywords" => Ok(Plan::KeywordTerms(Contribution::Keywords)),
            "media_content:type" => Ok(Plan::KeywordTerms(Contribution::Genres)),
            // Older schema versions model licenses as keywords
            "copyright:license" => Ok(Plan::KeywordTerms(Contribution::Licenses)),
            _ => Err(unhandled_key()),
        },
        MetadatumType::People => match key {
            "madek_core:authors" => Ok(Plan::Authors),
            "zhdk_bereich:institutional_affiliation" => Ok(Plan::Affiliation),
            _ => Err(unhandled_key()),
        },
        MetadatumType::Licenses => match key {
            "copyright:license" => Ok(Plan::LicenseLabels),
            _ => Err(unhandled_key()),
        },
    }
}

impl Client {
    /// Compile the metadata listing found at `url`
    ///
    /// # Errors
    /// - Any transport error of the listing, a metadatum or a reference lookup
    /// - [`Error::UnhandledMetadatumType`] / [`Error::UnhandledMetadatumKey`]
    ///   for supported keys the compiler cannot map
    pub async fn compile_metadata(&self, url: &str) -> Result<Metadata> {
        let listing: MetaDataListing = self.fetch_document(url).await?;

        let retained: Vec<_> = listing
            .meta_data
            .into_iter()
            .filter(|entry| {
                let supported = self.is_supported_key(&entry.meta_key_id);
                if !supported {
                    trace!(key = %entry.meta_key_id, "Skipping unsupported meta key");
                }
                supported
            })
            .collect();

        let contributions = join_all_tasks(retained.into_iter().map(|entry| {
            let client = self.clone();
            async move { client.compile_metadatum(&entry.id, &entry.meta_key_id).await }
        }))
        .await?;

        let mut metadata = Metadata::default();
        for contribution in contributions {
            contribution.apply(&mut metadata);
        }

        debug!(url = %url, title = ?metadata.title, "Compiled metadata");
        Ok(metadata)
    }

    async fn compile_metadatum(&self, id: &str, key: &str) -> Result<Contribution> {
        let datum: MetaDatumDocument = self
            .fetch_document(&self.url(&format!("/api/meta-data/{}", id)))
            .await?;

        let contribution = match plan(&datum.datum_type, key)? {
            Plan::Text(into) => into(datum.text()),
            Plan::KeywordTerms(into) => {
                let terms = self
                    .resolve_each(datum.ids(), |client, id| async move {
                        client.resolve_keyword(&id).await
                    })
                    .await?;
                into(terms)
            }
            Plan::LicenseLabels => {
                let labels = self
                    .resolve_each(datum.ids(), |client, id| async move {
                        client.resolve_license(&id).await
                    })
                    .await?;
                Contribution::Licenses(labels)
            }
            Plan::Authors => {
                let authors = self
                    .resolve_each(datum.ids(), |client, id| async move {
                        client.resolve_author(&id).await
                    })
                    .await?;
                Contribution::Authors(authors)
            }
            Plan::Affiliation => {
                let groups = self
                    .resolve_each(datum.ids(), |client, id| async move {
                        client.resolve_group(&id).await
                    })
                    .await?;
                Contribution::Affiliation(groups)
            }
        };

        Ok(contribution)
    }

    /// Resolve every id concurrently, keeping the order of `ids`
    async fn resolve_each<T, F, Fut>(&self, ids: Vec<String>, resolve: F) -> Result<Vec<T>>
    where
        F: Fn(Client, String) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        join_all_tasks(ids.into_iter().map(|id| resolve(self.clone(), id))).await
    }
}
