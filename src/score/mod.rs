//! Notation score model
//!
//! Format-agnostic score produced by the tab converter and consumed by the
//! score writers (MIDI, MusicXML, JSON).
//!
//! Offsets and durations are exact fractions of a quarter note
//! ([`QuarterLength`]), so tab tick values convert without rounding.

pub mod duration;
pub mod pitch;
pub mod types;

// Re-export commonly used types for convenience
pub use duration::{notatable_parts, Duration, DurationType, QuarterLength, Rational, TupletRatio};
pub use pitch::Pitch;
pub use types::{
    Barline, BarlineType, Event, Instrument, Measure, Metadata, MetronomeMark, NoteEvent, Part,
    RestEvent, Score, TieData, TieType, TimeSignature, Voice,
};
