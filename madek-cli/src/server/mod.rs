//! HTTP server
//!
//! - `GET /health`: liveness
//! - `GET /:id`: compiled collection
//! - `GET /media-entries/:id`: compiled media entry
//!
//! Compiled documents are kept in a [`ResponseCache`](cache::ResponseCache)
//! when caching is enabled; `?fresh=yes` bypasses it.

pub mod cache;
pub mod error;
pub mod handlers;
pub mod health;
