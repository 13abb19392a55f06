//! # Madek Compiler
//!
//! Compiles Madek media-archive resources into self-contained JSON documents:
//! - Collections with all member media entries (paginated discovery)
//! - Media entries with metadata, file descriptor and previews
//! - Metadata listings filtered through the supported meta keys
//! - Entity references (authors, groups, keywords, licenses) memoized per
//!   session in the [`ReferenceCache`]
//!
//! Every fetch goes through a [`Transport`](transport::Transport); every
//! independent fetch runs on its own tokio task.

pub mod cache;
pub mod client;
pub mod collection;
mod documents;
pub mod error;
mod fanout;
pub mod media_entry;
pub mod metadata;
pub mod references;
pub mod transport;

pub use cache::{Reference, ReferenceCache, ReferenceKind};
pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use madek_common::models::{Author, Collection, Copyright, Group, MediaEntry, Metadata, Preview};
pub use metadata::SUPPORTED_META_KEYS;
