//! Score writers
//!
//! Renderers turn a converted [`Score`](crate::score::Score) into an
//! interchange format: Standard MIDI Files and MusicXML.

pub mod midi;
pub mod musicxml;

pub use midi::{score_to_smf, MidiExportError, MidiExportSettings};
pub use musicxml::emit_musicxml;
