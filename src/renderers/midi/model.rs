//! Lean MIDI representation of a score
//!
//! Absolute ticks everywhere; delta times are only computed when the SMF is
//! written.

use crate::score::{QuarterLength, Rational};

#[derive(Debug, Clone, PartialEq)]
pub struct MidiScore {
    pub tpq: u16,                   // Ticks per quarter note
    pub tempos: Vec<MidiTempo>,     // sorted by tick
    pub timesigs: Vec<MidiTimeSig>, // sorted by tick
    pub parts: Vec<MidiPart>,       // One per score part
}

#[derive(Debug, Clone, PartialEq)]
pub struct MidiTempo {
    pub tick: u64,
    pub bpm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MidiTimeSig {
    pub tick: u64,
    pub num: u8,
    pub den: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MidiPart {
    pub name: String,
    pub channel: u8,         // MIDI channel 0-15 (9 = drums)
    pub program: Option<u8>, // None for percussion
    pub notes: Vec<MidiNote>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MidiNote {
    pub start_tick: u64,
    pub dur_tick: u64,
    pub pitch: u8,
    pub vel: u8,
}

/// Convert a quarter length to MIDI ticks, rounding to the nearest tick
pub fn quarter_length_to_ticks(length: QuarterLength, tpq: u16) -> u64 {
    let ticks = (length * Rational::from_integer(tpq as i64)).round().to_integer();
    ticks.max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_length_to_ticks() {
        assert_eq!(quarter_length_to_ticks(Rational::from_integer(1), 960), 960);
        assert_eq!(quarter_length_to_ticks(Rational::new(1, 3), 960), 320);
        assert_eq!(quarter_length_to_ticks(Rational::new(1, 3), 480), 160);
        // 1/3 of a quarter at 100 tpq = 33.3 -> 33
        assert_eq!(quarter_length_to_ticks(Rational::new(1, 3), 100), 33);
    }
}
