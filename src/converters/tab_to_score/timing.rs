//! Tick / quarter-length arithmetic
//!
//! Tab beats are positioned on a 960-ticks-per-quarter grid; score events use
//! exact quarter-note fractions. Everything that crosses between the two
//! timing models goes through this module.

use crate::models::{self, QUARTER_TIME};
use crate::score::{Duration, DurationType, QuarterLength, Rational, RestEvent, TimeSignature, TupletRatio};

/// Ticks per quarter note, fixed by the tab format
pub const TICKS_PER_QUARTER: i64 = QUARTER_TIME as i64;

/// Convert a tick count to quarter notes
pub fn ticks_to_quarter_length(ticks: i64) -> QuarterLength {
    Rational::new(ticks, TICKS_PER_QUARTER)
}

/// Derive the score time signature of a tab measure
///
/// Zero numerators or denominators are clamped to 1. A dotted denominator is
/// multiplied by 1.5. Returns the signature and whether clamping happened.
pub fn score_time_signature(ts: &models::TimeSignature) -> (TimeSignature, bool) {
    let clamped = ts.numerator == 0 || ts.denominator == 0;
    let numerator = ts.numerator.max(1);
    let mut denominator = Rational::from_integer(ts.denominator.max(1) as i64);
    if ts.denominator_dotted {
        denominator *= Rational::new(3, 2);
    }
    (TimeSignature { numerator, denominator }, clamped)
}

/// Declared length of a measure in ticks: `960 * (4 / denominator) * numerator`, truncated
pub fn measure_duration_in_ticks(ts: &TimeSignature) -> i64 {
    (Rational::from_integer(TICKS_PER_QUARTER) * ts.bar_quarter_length()).to_integer()
}

/// Score duration of a tab beat
///
/// Returns `None` when the note value is not a supported power of two; the
/// caller falls back to [`duration_from_ticks`].
pub fn beat_duration(duration: &models::Duration) -> Option<Duration> {
    let kind = DurationType::from_value(duration.value)?;
    let dots = if duration.dotted { 1 } else { 0 };
    let mut result = Duration::new(kind, dots);
    if !duration.tuplet.is_trivial() {
        result = result.with_tuplet(TupletRatio::new(duration.tuplet.enters, duration.tuplet.times));
    }
    Some(result)
}

/// Score duration spanning a raw tick count
pub fn duration_from_ticks(ticks: i64) -> Duration {
    Duration::from_quarter_length(ticks_to_quarter_length(ticks))
}

/// Rest completing a voice whose last beat ends before the bar line
///
/// `remaining = measure ticks - (last.start + last.duration ticks)`. Returns
/// `None` when the measure is exactly filled or overfull. The rest's offset is
/// where the last beat ends.
pub fn trailing_rest(ts: &TimeSignature, last_beat: &models::Beat) -> Option<RestEvent> {
    let consumed = last_beat.start as i64 + last_beat.duration.ticks() as i64;
    let remaining = measure_duration_in_ticks(ts) - consumed;
    if remaining <= 0 {
        return None;
    }
    Some(RestEvent {
        offset: ticks_to_quarter_length(consumed),
        duration: duration_from_ticks(remaining),
    })
}
