//! Default values for MIDI export
//!
//! Provides defaults for resolution, velocity and channel assignment, and the
//! [`MidiExportSettings`] that carry them.

use serde::{Deserialize, Serialize};

use crate::utils::PERCUSSION_CHANNEL;

/// Default tempo in beats per minute, used when a score carries no tempo mark
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Default MIDI velocity (1-127, where 64 is "normal")
pub const DEFAULT_VELOCITY: u8 = 64;

/// Default ticks per quarter note, matching the tab grid so no rounding occurs
pub const DEFAULT_TPQ: u16 = 960;

/// Assign a MIDI channel to the n-th melodic part
/// - Channels 0-15 are available
/// - Channel 9 (10 in 1-indexed) is reserved for drums
pub fn assign_channel(melodic_index: usize) -> u8 {
    let channel = (melodic_index % 15) as u8;
    if channel >= PERCUSSION_CHANNEL {
        channel + 1
    } else {
        channel
    }
}

/// Settings for Standard MIDI File export
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiExportSettings {
    pub ticks_per_quarter: u16,
    /// Velocity for every note on (1-127)
    pub velocity: u8,
}

impl Default for MidiExportSettings {
    fn default() -> Self {
        MidiExportSettings {
            ticks_per_quarter: DEFAULT_TPQ,
            velocity: DEFAULT_VELOCITY,
        }
    }
}
