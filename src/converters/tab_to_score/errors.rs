//! Error types for tab-to-score conversion
//!
//! Only structurally unusable songs are errors; everything else degrades
//! with a diagnostic.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Song is missing required content (tracks, positive tempo)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
