//! # Madek Common Library
//!
//! Shared code for the Madek workspace:
//! - Compiled document models (collections, media entries, metadata)
//! - Configuration loading and resolution
//! - Common error types

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
