//! MusicXML export module
//!
//! Provides MusicXML 3.1 partwise export for scores.
//!
//! # Module Structure
//!
//! - **builder**: MusicXML XML structure building (part list, attributes, notes, barlines)
//! - **emitter**: Score walk driving the builder (voices, chords, backup/forward)

pub mod builder;
pub mod emitter;

pub use builder::{MusicXmlBuilder, NoteLayout, DIVISIONS};
pub use emitter::emit_musicxml;
