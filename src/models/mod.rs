//! Tablature source model
//!
//! In-memory form of a parsed Guitar Pro style song, as handed over by a tab
//! loader. The converter only reads it.
//!
//! ```text
//! Song
//! └── Track (name, program, percussion)
//!     └── Measure (time signature, repeats)
//!         └── Voice
//!             └── Beat (start tick, duration, effects)
//!                 └── Note (string, pitch, type)
//! ```

pub mod duration;
pub mod song;

// Re-export commonly used types
pub use duration::{Duration, Tuplet, QUARTER_TIME};
pub use song::{
    Beat, BeatEffect, BeatStatus, Measure, MixTableChange, Note, NoteType, Song, TimeSignature,
    Track, Voice,
};
