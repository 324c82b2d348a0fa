//! Song, track, measure, voice, beat and note

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::duration::Duration;

/// A parsed tablature song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    /// Beats per minute
    pub tempo: f64,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Song {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, tempo: f64) -> Self {
        Song {
            title: Some(title.into()),
            artist: Some(artist.into()),
            tempo,
            tracks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    /// General MIDI program number (0-127)
    #[serde(default)]
    pub instrument: u8,
    #[serde(default)]
    pub is_percussion: bool,
    #[serde(default)]
    pub measures: Vec<Measure>,
}

impl Track {
    pub fn new(name: impl Into<String>, instrument: u8) -> Self {
        Track {
            name: name.into(),
            instrument,
            is_percussion: false,
            measures: Vec::new(),
        }
    }

    pub fn percussion(name: impl Into<String>) -> Self {
        Track {
            is_percussion: true,
            ..Track::new(name, 0)
        }
    }
}

/// Time signature as written in the tab
///
/// The denominator may be dotted (e.g. 2/4. for compound meters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
    #[serde(default)]
    pub denominator_dotted: bool,
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        TimeSignature {
            numerator,
            denominator,
            denominator_dotted: false,
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::new(4, 4)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    #[serde(default)]
    pub time_signature: TimeSignature,
    #[serde(default)]
    pub repeat_open: bool,
    /// Number of repeats closed by this measure; zero or negative means none
    #[serde(default)]
    pub repeat_close: i32,
    #[serde(default)]
    pub voices: Vec<Voice>,
}

impl Measure {
    pub fn new(time_signature: TimeSignature) -> Self {
        Measure {
            time_signature,
            repeat_open: false,
            repeat_close: 0,
            voices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    #[serde(default)]
    pub beats: Vec<Beat>,
}

impl Voice {
    pub fn new(beats: Vec<Beat>) -> Self {
        Voice { beats }
    }

    /// A voice with no beats, or only placeholder beats, carries no music
    pub fn is_empty(&self) -> bool {
        self.beats.iter().all(|beat| beat.status == BeatStatus::Empty)
    }
}

/// Beat status codes as stored by Guitar Pro
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum BeatStatus {
    Empty = 0,
    #[default]
    Normal = 1,
    Rest = 2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    /// Tick offset of the beat within its measure
    pub start: u32,
    pub duration: Duration,
    #[serde(default)]
    pub status: BeatStatus,
    #[serde(default)]
    pub effect: BeatEffect,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Beat {
    pub fn new(start: u32, duration: Duration) -> Self {
        Beat {
            start,
            duration,
            status: BeatStatus::Normal,
            effect: BeatEffect::default(),
            notes: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: Vec<Note>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_tempo_change(mut self, tempo: f64) -> Self {
        self.effect.mix_table_change = Some(MixTableChange { tempo: Some(tempo) });
        self
    }

    /// Tempo requested by the beat's mix table change, if any
    pub fn tempo_change(&self) -> Option<f64> {
        self.effect
            .mix_table_change
            .as_ref()
            .and_then(|change| change.tempo)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatEffect {
    #[serde(default)]
    pub mix_table_change: Option<MixTableChange>,
}

/// Mix table change embedded in a beat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixTableChange {
    #[serde(default)]
    pub tempo: Option<f64>,
}

/// Note type codes as stored by Guitar Pro
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
pub enum NoteType {
    Rest = 0,
    #[default]
    Normal = 1,
    /// Continuation of the previous note on the same string
    Tie = 2,
    Dead = 3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// String number the note is played on
    pub string: u8,
    /// Sounding pitch as a MIDI note number
    pub real_value: u8,
    #[serde(default, rename = "type")]
    pub kind: NoteType,
}

impl Note {
    pub fn new(string: u8, real_value: u8) -> Self {
        Note {
            string,
            real_value,
            kind: NoteType::Normal,
        }
    }

    pub fn tie(string: u8, real_value: u8) -> Self {
        Note {
            kind: NoteType::Tie,
            ..Note::new(string, real_value)
        }
    }

    pub fn dead(string: u8) -> Self {
        Note {
            kind: NoteType::Dead,
            ..Note::new(string, 0)
        }
    }
}
