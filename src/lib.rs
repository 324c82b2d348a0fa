//! Guitar Pro tab to music score conversion
//!
//! Reads a parsed tablature song (tracks, measures, voices, beats, string
//! notes on a 960 ticks-per-quarter grid) and builds an equivalent notation
//! score with exact rational timing. The score can then be written as a
//! Standard MIDI File, MusicXML or JSON.
//!
//! Logging goes through the `log` facade; the host chooses the backend.

pub mod converters;
pub mod diagnostics;
pub mod models;
pub mod renderers;
pub mod score;
pub mod serialization;
pub mod utils;

// Re-export commonly used types
pub use converters::tab_to_score::{convert_song, ConversionError, ConversionResult, Converter};
pub use diagnostics::{DiagnosticMark, DiagnosticSeverity, Diagnostics, SourceLocation};
pub use models::Song;
pub use score::Score;
pub use serialization::{ScoreFormat, ScoreSerializer, SerializationError, Serializer, TabSerializer};
