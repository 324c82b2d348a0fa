//! Guitar Pro tab to score converter
//!
//! Turns a parsed tab [`Song`](crate::models::Song) into a notation
//! [`Score`](crate::score::Score).
//!
//! # Overview
//!
//! The conversion is a single ordered walk:
//! 1. **Metadata**: title (file suffix dropped), artist as composer, tempo
//! 2. **Parts**: one per track, with a General MIDI instrument or unpitched percussion
//! 3. **Measures**: time signature where it changes, tempo mark, repeat barlines
//! 4. **Voices**: beats become notes and rests at exact quarter-note offsets
//! 5. **Ties**: tab tie notes lengthen the previous note on the same string
//! 6. **Padding**: voices that end early get a trailing rest
//!
//! Problems that do not stop the conversion (dead notes, orphan ties, zero
//! time signatures) are reported as [`Diagnostics`] next to the score.
//!
//! # Basic Usage
//!
//! ```ignore
//! use tab2score::converters::tab_to_score::convert_song;
//!
//! let result = convert_song(&song)?;
//! for mark in &result.diagnostics.marks {
//!     eprintln!("{}: {}", mark.location, mark.message);
//! }
//! println!("{} parts", result.score.parts.len());
//! ```

pub mod converter;
pub mod errors;
pub mod metadata;
pub mod ties;
pub mod timing;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::models::Song;
use crate::score::Score;

// Re-export main API
pub use converter::{part_id, Converter};
pub use errors::{ConversionError, Result};
pub use metadata::{extract_metadata, score_title, SongMetadata};

/// Converted score plus everything that was degraded or dropped on the way
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub score: Score,
    pub diagnostics: Diagnostics,
}

/// Convert a tab song into a score
///
/// # Returns
///
/// * `Ok(ConversionResult)` - Score with conversion diagnostics
/// * `Err(ConversionError)` - Song has no tracks or no usable tempo
pub fn convert_song(song: &Song) -> Result<ConversionResult> {
    Ok(Converter::new(song)?.apply())
}
