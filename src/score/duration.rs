//! Quarter-length durations
//!
//! Score durations are exact fractions of a quarter note. The notated type
//! (half, dotted eighth, ...) is derived from the length rather than stored,
//! so a duration stretched by a tie stays consistent.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};

/// Exact fraction used for offsets and durations
pub type Rational = Rational64;

/// Length or position measured in quarter notes
pub type QuarterLength = Rational;

/// Notated duration family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationType {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
    HundredTwentyEighth,
}

impl DurationType {
    /// All types from longest to shortest
    pub const ALL: [DurationType; 8] = [
        DurationType::Whole,
        DurationType::Half,
        DurationType::Quarter,
        DurationType::Eighth,
        DurationType::Sixteenth,
        DurationType::ThirtySecond,
        DurationType::SixtyFourth,
        DurationType::HundredTwentyEighth,
    ];

    /// Look up a type from its power-of-two note value (1 = whole, 4 = quarter)
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            1 => Some(DurationType::Whole),
            2 => Some(DurationType::Half),
            4 => Some(DurationType::Quarter),
            8 => Some(DurationType::Eighth),
            16 => Some(DurationType::Sixteenth),
            32 => Some(DurationType::ThirtySecond),
            64 => Some(DurationType::SixtyFourth),
            128 => Some(DurationType::HundredTwentyEighth),
            _ => None,
        }
    }

    pub fn value(self) -> u32 {
        match self {
            DurationType::Whole => 1,
            DurationType::Half => 2,
            DurationType::Quarter => 4,
            DurationType::Eighth => 8,
            DurationType::Sixteenth => 16,
            DurationType::ThirtySecond => 32,
            DurationType::SixtyFourth => 64,
            DurationType::HundredTwentyEighth => 128,
        }
    }

    /// Undotted length in quarter notes
    pub fn quarter_length(self) -> QuarterLength {
        Rational::new(4, self.value() as i64)
    }

    /// MusicXML `<type>` name
    pub fn name(self) -> &'static str {
        match self {
            DurationType::Whole => "whole",
            DurationType::Half => "half",
            DurationType::Quarter => "quarter",
            DurationType::Eighth => "eighth",
            DurationType::Sixteenth => "16th",
            DurationType::ThirtySecond => "32nd",
            DurationType::SixtyFourth => "64th",
            DurationType::HundredTwentyEighth => "128th",
        }
    }
}

/// Tuplet ratio: `actual_notes` in the time of `normal_notes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupletRatio {
    pub actual_notes: u32,
    pub normal_notes: u32,
}

impl TupletRatio {
    pub fn new(actual_notes: u32, normal_notes: u32) -> Self {
        TupletRatio {
            actual_notes,
            normal_notes,
        }
    }

    /// Factor applied to the written length (2/3 for a triplet)
    pub fn factor(&self) -> Rational {
        Rational::new(self.normal_notes as i64, self.actual_notes.max(1) as i64)
    }
}

/// Length multiplier for `dots` augmentation dots: 1, 3/2, 7/4 ...
fn dot_factor(dots: u8) -> Rational {
    let denom = 1i64 << dots;
    Rational::new(2 * denom - 1, denom)
}

/// Duration of a note or rest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    quarter_length: QuarterLength,
    tuplet: Option<TupletRatio>,
}

impl Duration {
    pub fn new(kind: DurationType, dots: u8) -> Self {
        Duration {
            quarter_length: kind.quarter_length() * dot_factor(dots),
            tuplet: None,
        }
    }

    pub fn from_quarter_length(quarter_length: QuarterLength) -> Self {
        Duration {
            quarter_length,
            tuplet: None,
        }
    }

    /// Place the duration inside a tuplet, scaling its length
    pub fn with_tuplet(mut self, ratio: TupletRatio) -> Self {
        self.quarter_length *= ratio.factor();
        self.tuplet = Some(ratio);
        self
    }

    pub fn quarter_length(&self) -> QuarterLength {
        self.quarter_length
    }

    pub fn tuplet(&self) -> Option<TupletRatio> {
        self.tuplet
    }

    /// Lengthen the duration, e.g. to absorb a tied continuation
    ///
    /// The stretched length no longer belongs to a tuplet group.
    pub fn extend(&mut self, by: QuarterLength) {
        self.quarter_length += by;
        self.tuplet = None;
    }

    /// Written type and dot count, or `None` when no single notated value fits
    pub fn notation(&self) -> Option<(DurationType, u8)> {
        let written = match self.tuplet {
            Some(ratio) => self.quarter_length / ratio.factor(),
            None => self.quarter_length,
        };
        for dots in 0..=2 {
            for kind in DurationType::ALL {
                if kind.quarter_length() * dot_factor(dots) == written {
                    return Some((kind, dots));
                }
            }
        }
        None
    }

    /// True when the length needs more than one notated value (e.g. 5/4)
    pub fn is_complex(&self) -> bool {
        self.notation().is_none()
    }
}

/// Split a length into plain or dotted values, longest first
///
/// A length that is not a whole number of 128ths stays in one piece.
pub fn notatable_parts(length: QuarterLength) -> Vec<Duration> {
    let whole = Duration::from_quarter_length(length);
    let smallest = DurationType::HundredTwentyEighth.quarter_length();
    if whole.notation().is_some() || length <= Rational::from_integer(0) || !(length / smallest).is_integer() {
        return vec![whole];
    }

    let mut parts = Vec::new();
    let mut remaining = length;
    while remaining > Rational::from_integer(0) {
        let candidate = DurationType::ALL
            .iter()
            .flat_map(|&kind| [(kind, 1u8), (kind, 0u8)])
            .map(|(kind, dots)| kind.quarter_length() * dot_factor(dots))
            .filter(|&piece| piece <= remaining)
            .max();
        let Some(piece) = candidate else {
            parts.push(Duration::from_quarter_length(remaining));
            break;
        };
        parts.push(Duration::from_quarter_length(piece));
        remaining -= piece;
    }
    parts
}
