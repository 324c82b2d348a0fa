//! Format converters
//!
//! Converters between the tab model and the notation score model.

pub mod tab_to_score;

// Re-export for convenience
pub use tab_to_score::{convert_song, ConversionError, ConversionResult, Converter};
