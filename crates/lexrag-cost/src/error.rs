//! Error types for lexrag-cost

use thiserror::Error;

/// Cost accounting error type
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied a negative or non-finite quantity
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Externally supplied billing rate is negative or non-finite
    #[error("invalid rate: {0}")]
    InvalidRate(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
