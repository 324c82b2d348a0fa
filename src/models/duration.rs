//! Tick-based beat durations

use serde::{Deserialize, Serialize};

/// Ticks per quarter note in the tablature timing model
pub const QUARTER_TIME: u32 = 960;

/// Tuplet ratio: `enters` notes in the time of `times`
///
/// A triplet is `3:2`. The default `1:1` ratio leaves durations untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuplet {
    pub enters: u32,
    pub times: u32,
}

impl Tuplet {
    pub fn new(enters: u32, times: u32) -> Self {
        Tuplet { enters, times }
    }

    /// True for ratios that do not change a duration (`n:n`, or a zero side)
    pub fn is_trivial(&self) -> bool {
        self.enters == self.times || self.enters == 0 || self.times == 0
    }

    /// Scale a plain duration in ticks into the tuplet's time
    pub fn convert_ticks(&self, ticks: u32) -> u32 {
        if self.is_trivial() {
            ticks
        } else {
            ticks * self.times / self.enters
        }
    }
}

impl Default for Tuplet {
    fn default() -> Self {
        Tuplet { enters: 1, times: 1 }
    }
}

/// Duration of a beat
///
/// `value` is the note value as a power of two: 1 = whole, 2 = half,
/// 4 = quarter ... 128 = 128th.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub value: u32,
    #[serde(default)]
    pub dotted: bool,
    #[serde(default)]
    pub tuplet: Tuplet,
}

impl Duration {
    pub const WHOLE: u32 = 1;
    pub const HALF: u32 = 2;
    pub const QUARTER: u32 = 4;
    pub const EIGHTH: u32 = 8;
    pub const SIXTEENTH: u32 = 16;
    pub const THIRTY_SECOND: u32 = 32;
    pub const SIXTY_FOURTH: u32 = 64;
    pub const HUNDRED_TWENTY_EIGHTH: u32 = 128;

    pub fn new(value: u32) -> Self {
        Duration {
            value,
            dotted: false,
            tuplet: Tuplet::default(),
        }
    }

    pub fn dotted(value: u32) -> Self {
        Duration {
            dotted: true,
            ..Duration::new(value)
        }
    }

    pub fn with_tuplet(mut self, tuplet: Tuplet) -> Self {
        self.tuplet = tuplet;
        self
    }

    /// Length in ticks, with dot and tuplet applied
    ///
    /// A zero `value` is read as a whole note.
    pub fn ticks(&self) -> u32 {
        let mut ticks = QUARTER_TIME * 4 / self.value.max(1);
        if self.dotted {
            ticks += ticks / 2;
        }
        self.tuplet.convert_ticks(ticks)
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::new(Duration::QUARTER)
    }
}
