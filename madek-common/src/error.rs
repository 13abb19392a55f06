//! Common error types for Madek

use thiserror::Error;

/// Common result type for Madek operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Madek crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
