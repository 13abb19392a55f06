//! Compiled document models
//!
//! These are the fully assembled values handed back to callers. Every type
//! serializes to the JSON shape served by the `madek` CLI and HTTP server.

mod collection;
mod media_entry;
mod metadata;

pub use self::collection::Collection;
pub use self::media_entry::{MediaEntry, Preview};
pub use self::metadata::{Author, Copyright, Group, Metadata};
