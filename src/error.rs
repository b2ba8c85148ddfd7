//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// Both variants signal programmer error and are raised at the point of
/// (mis)configuration. Nothing inside the cache retries or recovers from them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity or global TTL given as a non-numeric or negative value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Per-entry TTL override that cannot be applied
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
