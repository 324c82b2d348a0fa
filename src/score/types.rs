//! Score types
//!
//! ```text
//! Score
//! ├── Metadata (title, composer)
//! └── Part (one per tab track)
//!     ├── Instrument
//!     └── Measure
//!         ├── time signature?   (only where it changes)
//!         ├── tempo mark?       (first measure, tempo changes)
//!         ├── left/right barline
//!         └── Voice
//!             └── Event (Note | Rest) at an offset in quarter notes
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::duration::{Duration, QuarterLength, Rational};
use super::pitch::Pitch;

/// Score-level metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub composer: String,
}

/// Complete score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub metadata: Metadata,
    pub parts: Vec<Part>,
}

impl Score {
    pub fn new(metadata: Metadata) -> Self {
        Score {
            metadata,
            parts: Vec::new(),
        }
    }

    /// Number of measures in the longest part
    pub fn measure_count(&self) -> usize {
        self.parts.iter().map(|p| p.measures.len()).max().unwrap_or(0)
    }
}

/// Instrument a part is played on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    /// General MIDI program; `None` for unpitched percussion
    pub midi_program: Option<u8>,
    /// Fixed MIDI channel (zero-based), if the instrument requires one
    pub midi_channel: Option<u8>,
    pub unpitched: bool,
    /// Ordering among elements sharing an offset; lower sorts first
    pub priority: i32,
}

impl Instrument {
    /// Priority that keeps the instrument ahead of every notated event
    pub const LOWEST_PRIORITY: i32 = i32::MIN;

    pub fn pitched(name: impl Into<String>, program: u8) -> Self {
        Instrument {
            name: name.into(),
            midi_program: Some(program),
            midi_channel: None,
            unpitched: false,
            priority: Instrument::LOWEST_PRIORITY,
        }
    }

    pub fn unpitched_percussion(channel: u8) -> Self {
        Instrument {
            name: "Percussion".to_string(),
            midi_program: None,
            midi_channel: Some(channel),
            unpitched: true,
            priority: Instrument::LOWEST_PRIORITY,
        }
    }
}

/// One part (staff) of the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub name: String,
    pub instrument: Instrument,
    pub measures: Vec<Measure>,
}

impl Part {
    pub fn new(id: impl Into<String>, name: impl Into<String>, instrument: Instrument) -> Self {
        Part {
            id: id.into(),
            name: name.into(),
            instrument,
            measures: Vec::new(),
        }
    }

    /// Start offset and effective time signature of every measure
    ///
    /// Measures without an annotation inherit the previous signature; 4/4
    /// applies until the first annotation.
    pub fn measure_offsets(&self) -> Vec<(QuarterLength, TimeSignature)> {
        let mut offsets = Vec::with_capacity(self.measures.len());
        let mut offset = QuarterLength::from_integer(0);
        let mut current = TimeSignature::default();
        for measure in &self.measures {
            if let Some(ts) = measure.time_signature {
                current = ts;
            }
            offsets.push((offset, current));
            offset += current.bar_quarter_length();
        }
        offsets
    }
}

/// Time signature annotation
///
/// The denominator is rational so that dotted denominators (e.g. 4 x 1.5 = 6)
/// stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: Rational,
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        TimeSignature {
            numerator,
            denominator: Rational::from_integer(denominator as i64),
        }
    }

    /// Length of a full bar in quarter notes: `4 / denominator * numerator`
    pub fn bar_quarter_length(&self) -> QuarterLength {
        Rational::from_integer(4) / self.denominator * Rational::from_integer(self.numerator as i64)
    }

    /// Nearest power-of-two denominator, for formats that cannot write dotted ones
    pub fn written_denominator(&self) -> u32 {
        if self.denominator.is_integer() && (*self.denominator.numer() as u64).is_power_of_two() {
            return self.denominator.to_integer() as u32;
        }
        let value = *self.denominator.numer() as f64 / *self.denominator.denom() as f64;
        let power = value.max(1.0).log2().round().min(7.0);
        1u32 << (power as u32)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::new(4, 4)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator.is_integer() {
            write!(f, "{}/{}", self.numerator, self.denominator.to_integer())
        } else {
            let den = *self.denominator.numer() as f64 / *self.denominator.denom() as f64;
            write!(f, "{}/{}", self.numerator, den)
        }
    }
}

/// Tempo marking in quarter-note beats per minute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetronomeMark {
    pub bpm: f64,
}

impl MetronomeMark {
    pub fn new(bpm: f64) -> Self {
        MetronomeMark { bpm }
    }
}

/// Barline types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarlineType {
    StartRepeat,
    EndRepeat,
}

/// Barline at the start or end of a measure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barline {
    pub barline_type: BarlineType,
    /// Number of times a closing repeat is played
    pub times: Option<u32>,
}

impl Barline {
    pub fn start_repeat() -> Self {
        Barline {
            barline_type: BarlineType::StartRepeat,
            times: None,
        }
    }

    pub fn end_repeat(times: u32) -> Self {
        Barline {
            barline_type: BarlineType::EndRepeat,
            times: Some(times),
        }
    }
}

/// A measure of one part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub id: String,
    /// 1-based measure number
    pub number: usize,
    pub time_signature: Option<TimeSignature>,
    pub tempo: Option<MetronomeMark>,
    pub left_barline: Option<Barline>,
    pub right_barline: Option<Barline>,
    pub voices: Vec<Voice>,
}

impl Measure {
    pub fn new(id: impl Into<String>, number: usize) -> Self {
        Measure {
            id: id.into(),
            number,
            time_signature: None,
            tempo: None,
            left_barline: None,
            right_barline: None,
            voices: Vec::new(),
        }
    }

    /// Attach a tempo mark at the start of the measure, returning the mark it replaces
    pub fn replace_tempo(&mut self, mark: MetronomeMark) -> Option<MetronomeMark> {
        self.tempo.replace(mark)
    }

    /// Insert a voice; voices all start at the beginning of the measure
    pub fn insert_voice(&mut self, voice: Voice) -> usize {
        self.voices.push(voice);
        self.voices.len() - 1
    }
}

/// Tie information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieData {
    pub type_: TieType,
}

/// Where a note sits in a tied chain
///
/// The converter only marks chain starts; writers that split a note into
/// several written values use the other positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieType {
    Start,
    Continue,
    Stop,
}

/// Pitched note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Identifier unique within a conversion
    pub id: usize,
    pub offset: QuarterLength,
    pub pitch: Pitch,
    pub duration: Duration,
    pub tie: Option<TieData>,
    /// Tab string the note was played on
    pub string: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestEvent {
    pub offset: QuarterLength,
    pub duration: Duration,
}

/// An event in a voice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Note(NoteEvent),
    Rest(RestEvent),
}

impl Event {
    pub fn offset(&self) -> QuarterLength {
        match self {
            Event::Note(note) => note.offset,
            Event::Rest(rest) => rest.offset,
        }
    }

    pub fn set_offset(&mut self, offset: QuarterLength) {
        match self {
            Event::Note(note) => note.offset = offset,
            Event::Rest(rest) => rest.offset = offset,
        }
    }

    pub fn duration(&self) -> &Duration {
        match self {
            Event::Note(note) => &note.duration,
            Event::Rest(rest) => &rest.duration,
        }
    }

    /// Offset at which the event stops sounding
    pub fn end(&self) -> QuarterLength {
        self.offset() + self.duration().quarter_length()
    }

    pub fn as_note(&self) -> Option<&NoteEvent> {
        match self {
            Event::Note(note) => Some(note),
            Event::Rest(_) => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Event::Rest(_))
    }
}

/// A voice: events ordered by offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub events: Vec<Event>,
}

impl Voice {
    pub fn new(id: impl Into<String>) -> Self {
        Voice {
            id: id.into(),
            events: Vec::new(),
        }
    }

    /// Insert an event after every event at the same or an earlier offset
    pub fn insert(&mut self, event: Event) {
        let offset = event.offset();
        let index = self.events.partition_point(|e| e.offset() <= offset);
        self.events.insert(index, event);
    }

    /// Insert an event at the end of the voice's timeline
    pub fn append(&mut self, mut event: Event) {
        event.set_offset(self.highest_time());
        self.events.push(event);
    }

    /// Latest end offset of any event (zero for an empty voice)
    pub fn highest_time(&self) -> QuarterLength {
        self.events
            .iter()
            .map(Event::end)
            .max()
            .unwrap_or_else(|| QuarterLength::from_integer(0))
    }

    pub fn notes(&self) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter_map(Event::as_note)
    }

    pub fn rests(&self) -> impl Iterator<Item = &RestEvent> {
        self.events.iter().filter_map(|e| match e {
            Event::Rest(rest) => Some(rest),
            Event::Note(_) => None,
        })
    }

    pub fn note_mut(&mut self, id: usize) -> Option<&mut NoteEvent> {
        self.events.iter_mut().find_map(|e| match e {
            Event::Note(note) if note.id == id => Some(note),
            _ => None,
        })
    }
}
