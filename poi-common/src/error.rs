//! Common error types for the POI workspace

use thiserror::Error;

/// Common result type for POI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across POI crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
