//! Score-to-MIDI conversion
//!
//! Flattens the measure/voice hierarchy of a [`Score`] into absolute-tick
//! note lists, one per part, plus a shared tempo and time-signature map.

use std::collections::BTreeMap;

use crate::score::{Part, Score};
use crate::utils::PERCUSSION_CHANNEL;

use super::defaults::{assign_channel, MidiExportSettings, DEFAULT_TEMPO_BPM};
use super::model::{quarter_length_to_ticks, MidiNote, MidiPart, MidiScore, MidiTempo, MidiTimeSig};

/// Convert a score to its MIDI representation
///
/// Tempo marks of all parts are merged by tick (the first part to mark a tick
/// wins); time signatures come from the first part.
pub fn score_to_midi(score: &Score, settings: &MidiExportSettings) -> MidiScore {
    let tpq = settings.ticks_per_quarter.max(1);

    let mut tempos: BTreeMap<u64, f64> = BTreeMap::new();
    for part in &score.parts {
        for ((offset, _), measure) in part.measure_offsets().into_iter().zip(&part.measures) {
            if let Some(mark) = measure.tempo {
                tempos.entry(quarter_length_to_ticks(offset, tpq)).or_insert(mark.bpm);
            }
        }
    }
    if !tempos.contains_key(&0) {
        tempos.insert(0, DEFAULT_TEMPO_BPM);
    }

    let timesigs = score
        .parts
        .first()
        .map(|part| conductor_time_signatures(part, tpq))
        .unwrap_or_default();

    let mut melodic_index = 0;
    let parts = score
        .parts
        .iter()
        .map(|part| {
            let (channel, program) = if part.instrument.unpitched {
                (
                    part.instrument.midi_channel.unwrap_or(PERCUSSION_CHANNEL),
                    None,
                )
            } else {
                let channel = assign_channel(melodic_index);
                melodic_index += 1;
                (channel, part.instrument.midi_program)
            };
            MidiPart {
                name: part.name.clone(),
                channel,
                program,
                notes: part_notes(part, tpq, settings.velocity),
            }
        })
        .collect();

    MidiScore {
        tpq,
        tempos: tempos
            .into_iter()
            .map(|(tick, bpm)| MidiTempo { tick, bpm })
            .collect(),
        timesigs,
        parts,
    }
}

fn conductor_time_signatures(part: &Part, tpq: u16) -> Vec<MidiTimeSig> {
    part.measure_offsets()
        .into_iter()
        .zip(&part.measures)
        .filter(|(_, measure)| measure.time_signature.is_some())
        .map(|((offset, ts), _)| MidiTimeSig {
            tick: quarter_length_to_ticks(offset, tpq),
            num: ts.numerator.min(u8::MAX as u32) as u8,
            den: ts.written_denominator().min(128) as u8,
        })
        .collect()
}

/// Every note of a part at its absolute tick, sorted by start
fn part_notes(part: &Part, tpq: u16, velocity: u8) -> Vec<MidiNote> {
    let mut notes = Vec::new();
    for ((measure_offset, _), measure) in part.measure_offsets().into_iter().zip(&part.measures) {
        for voice in &measure.voices {
            for note in voice.notes() {
                notes.push(MidiNote {
                    start_tick: quarter_length_to_ticks(measure_offset + note.offset, tpq),
                    dur_tick: quarter_length_to_ticks(note.duration.quarter_length(), tpq),
                    pitch: note.pitch.midi,
                    vel: velocity.clamp(1, 127),
                });
            }
        }
    }
    notes.sort_by_key(|note| note.start_tick);
    notes
}
