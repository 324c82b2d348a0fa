//! Per-string tie tracking
//!
//! A tab tie note does not sound on its own: it lengthens the last normal note
//! played on the same string. The table remembers where that note lives in the
//! score being built (measure, voice, note id) instead of holding a reference
//! to it.

use std::collections::HashMap;

use crate::score::QuarterLength;

/// Location of the last normal note on a string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiedNote {
    pub measure_index: usize,
    pub voice_index: usize,
    pub note_id: usize,
}

/// String number -> last normal note on that string
#[derive(Debug, Default)]
pub struct TieTable {
    entries: HashMap<u8, TiedNote>,
}

impl TieTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a normal note, replacing any earlier one on the string
    pub fn record(&mut self, string: u8, note: TiedNote) -> Option<TiedNote> {
        self.entries.insert(string, note)
    }

    pub fn get(&self, string: u8) -> Option<TiedNote> {
        self.entries.get(&string).copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Amount to add to a recorded note so it covers a tied continuation
///
/// Within one measure the gap between the recorded note's end and the tie's
/// offset is closed as well. Across a bar line the gap term is zero and only
/// the tie's own length is added.
pub fn tie_extension(
    recorded_offset: QuarterLength,
    recorded_length: QuarterLength,
    tie_offset: QuarterLength,
    tie_length: QuarterLength,
    same_measure: bool,
) -> QuarterLength {
    let gap = if same_measure {
        (tie_offset - recorded_offset) - recorded_length
    } else {
        QuarterLength::from_integer(0)
    };
    gap + tie_length
}
