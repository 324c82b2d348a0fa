//! Score-to-MIDI export
//!
//! Two stages: the score is flattened into a lean absolute-tick
//! representation ([`MidiScore`]), which is then written as a Standard MIDI
//! File format 1 with `midly`.
//!
//! # Usage
//! ```rust,ignore
//! use tab2score::renderers::midi::{score_to_smf, MidiExportSettings};
//!
//! let bytes = score_to_smf(&score, &MidiExportSettings::default())?;
//! std::fs::write("song.mid", bytes)?;
//! ```

pub mod converter;
pub mod defaults;
pub mod model;
pub mod write;

use thiserror::Error;

use crate::score::Score;

pub use converter::score_to_midi;
pub use defaults::{assign_channel, MidiExportSettings, DEFAULT_TEMPO_BPM, DEFAULT_TPQ, DEFAULT_VELOCITY};
pub use model::{MidiNote, MidiPart, MidiScore, MidiTempo, MidiTimeSig};
pub use write::write_smf;

#[derive(Debug, Error)]
pub enum MidiExportError {
    #[error("invalid midi data: {0}")]
    Invalid(String),
    #[error("midi write error: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, MidiExportError>;

/// Convert a score to SMF (Standard MIDI File) bytes
pub fn score_to_smf(score: &Score, settings: &MidiExportSettings) -> Result<Vec<u8>> {
    let midi = score_to_midi(score, settings);
    let mut out = Vec::new();
    write_smf(&midi, &mut out)?;
    log::info!(
        "wrote MIDI: {} tracks, {} notes, {} bytes",
        midi.parts.len() + 1,
        midi.parts.iter().map(|p| p.notes.len()).sum::<usize>(),
        out.len()
    );
    Ok(out)
}
