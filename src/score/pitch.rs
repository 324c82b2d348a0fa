//! MIDI-number pitches with sharp spelling

use serde::{Deserialize, Serialize};
use std::fmt;

const STEP_NAMES: [(char, i8); 12] = [
    ('C', 0),
    ('C', 1),
    ('D', 0),
    ('D', 1),
    ('E', 0),
    ('F', 0),
    ('F', 1),
    ('G', 0),
    ('G', 1),
    ('A', 0),
    ('A', 1),
    ('B', 0),
];

/// Sounding pitch, stored as a MIDI note number (60 = C4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub midi: u8,
}

impl Pitch {
    pub fn new(midi: u8) -> Self {
        Pitch { midi: midi.min(127) }
    }

    /// Step letter, chromatic alteration and octave (C4 = middle C)
    pub fn step_alter_octave(&self) -> (char, i8, i8) {
        let (step, alter) = STEP_NAMES[(self.midi % 12) as usize];
        let octave = (self.midi / 12) as i8 - 1;
        (step, alter, octave)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (step, alter, octave) = self.step_alter_octave();
        let accidental = if alter > 0 { "#" } else { "" };
        write!(f, "{}{}{}", step, accidental, octave)
    }
}
