use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};

use super::model::*;
use super::{MidiExportError, Result};

/// Largest delta time a MIDI variable-length quantity can hold
const MAX_TICK: u64 = 0x0FFF_FFFF;

/// Write a MIDI score as a Standard MIDI File (SMF) Format 1
pub fn write_smf(score: &MidiScore, out: &mut Vec<u8>) -> Result<()> {
    let mut tracks = Vec::with_capacity(score.parts.len() + 1);

    // Track 0: Tempo and time signature map
    tracks.push(build_conductor_track(score)?);

    // Tracks 1+: One per part
    for part in &score.parts {
        tracks.push(build_part_track(part)?);
    }

    let smf = Smf {
        header: Header {
            format: Format::Parallel,
            timing: Timing::Metrical(score.tpq.into()),
        },
        tracks,
    };

    smf.write(out)
        .map_err(|e| MidiExportError::Write(e.to_string()))?;

    Ok(())
}

fn tick(value: u64) -> Result<u32> {
    if value > MAX_TICK {
        return Err(MidiExportError::Invalid(format!(
            "tick {} exceeds the MIDI time range",
            value
        )));
    }
    Ok(value as u32)
}

fn build_conductor_track<'a>(score: &MidiScore) -> Result<Track<'a>> {
    let mut events = Vec::new();

    for tempo in &score.tempos {
        let microseconds_per_quarter = ((60_000_000.0 / tempo.bpm) as u32).min(0x00FF_FFFF);
        events.push(TrackEvent {
            delta: tick(tempo.tick)?.into(),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(microseconds_per_quarter.into())),
        });
    }

    for ts in &score.timesigs {
        // Denominator as power of 2 (e.g., 4 -> 2, 8 -> 3)
        let denominator_power = ts.den.max(1).trailing_zeros() as u8;
        events.push(TrackEvent {
            delta: tick(ts.tick)?.into(),
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
                ts.num,
                denominator_power,
                24, // MIDI clocks per metronome click
                8,  // 32nd notes per quarter note
            )),
        });
    }

    events.sort_by_key(|e| e.delta.as_int());
    convert_to_delta_times(&mut events);

    events.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    Ok(events)
}

fn build_part_track(part: &MidiPart) -> Result<Track<'_>> {
    let mut events = Vec::new();

    events.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(part.name.as_bytes())),
    });

    if let Some(program) = part.program {
        events.push(TrackEvent {
            delta: 0.into(),
            kind: TrackEventKind::Midi {
                channel: part.channel.into(),
                message: MidiMessage::ProgramChange {
                    program: program.into(),
                },
            },
        });
    }

    for note in &part.notes {
        events.push(TrackEvent {
            delta: tick(note.start_tick)?.into(),
            kind: TrackEventKind::Midi {
                channel: part.channel.into(),
                message: MidiMessage::NoteOn {
                    key: note.pitch.into(),
                    vel: note.vel.into(),
                },
            },
        });
        events.push(TrackEvent {
            delta: tick(note.start_tick + note.dur_tick)?.into(),
            kind: TrackEventKind::Midi {
                channel: part.channel.into(),
                message: MidiMessage::NoteOff {
                    key: note.pitch.into(),
                    vel: 0.into(),
                },
            },
        });
    }

    // Note offs sort ahead of note ons sharing a tick so repeated pitches retrigger
    events.sort_by_key(|e| (e.delta.as_int(), is_note_on(e)));
    convert_to_delta_times(&mut events);

    events.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    Ok(events)
}

fn is_note_on(event: &TrackEvent) -> bool {
    matches!(
        event.kind,
        TrackEventKind::Midi {
            message: MidiMessage::NoteOn { .. },
            ..
        }
    )
}

/// Convert absolute tick times to delta times (time since previous event)
fn convert_to_delta_times(events: &mut [TrackEvent]) {
    let mut prev_tick = 0u32;
    for event in events.iter_mut() {
        let current_tick = event.delta.as_int();
        event.delta = current_tick.saturating_sub(prev_tick).into();
        prev_tick = current_tick;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piano(notes: Vec<MidiNote>) -> MidiPart {
        MidiPart {
            name: "Piano".to_string(),
            channel: 0,
            program: Some(0),
            notes,
        }
    }

    fn score(parts: Vec<MidiPart>) -> MidiScore {
        MidiScore {
            tpq: 960,
            tempos: vec![MidiTempo { tick: 0, bpm: 120.0 }],
            timesigs: vec![MidiTimeSig { tick: 0, num: 4, den: 4 }],
            parts,
        }
    }

    fn note(start_tick: u64, dur_tick: u64, pitch: u8) -> MidiNote {
        MidiNote { start_tick, dur_tick, pitch, vel: 64 }
    }

    #[test]
    fn test_write_multi_track_smf() {
        let mut out = Vec::new();
        write_smf(&score(vec![piano(vec![note(0, 960, 60)]), piano(vec![])]), &mut out).unwrap();

        assert_eq!(&out[0..4], b"MThd");
        // Format 1
        assert_eq!(out[8..10], [0x00, 0x01]);
        // 1 conductor + 2 parts
        assert_eq!(out[10..12], [0x00, 0x03]);
    }

    #[test]
    fn test_delta_time_conversion() {
        let mut events = vec![
            TrackEvent {
                delta: 0.into(),
                kind: TrackEventKind::Meta(MetaMessage::TrackName(b"Test")),
            },
            TrackEvent {
                delta: 100.into(),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
            TrackEvent {
                delta: 250.into(),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
        ];
        convert_to_delta_times(&mut events);

        assert_eq!(events[1].delta.as_int(), 100);
        assert_eq!(events[2].delta.as_int(), 150);
    }

    #[test]
    fn test_repeated_pitch_releases_before_retrigger() {
        let part = piano(vec![note(0, 960, 64), note(960, 960, 64)]);
        let track = build_part_track(&part).unwrap();

        let kinds: Vec<&str> = track
            .iter()
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi { message: MidiMessage::NoteOn { .. }, .. } => Some("on"),
                TrackEventKind::Midi { message: MidiMessage::NoteOff { .. }, .. } => Some("off"),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec!["on", "off", "on", "off"]);
    }

    #[test]
    fn test_percussion_has_no_program_change() {
        let drums = MidiPart {
            name: "Drums".to_string(),
            channel: 9,
            program: None,
            notes: vec![note(0, 480, 36)],
        };
        let track = build_part_track(&drums).unwrap();
        assert!(!track.iter().any(|e| matches!(
            e.kind,
            TrackEventKind::Midi { message: MidiMessage::ProgramChange { .. }, .. }
        )));
    }

    #[test]
    fn test_rejects_out_of_range_ticks() {
        let part = piano(vec![note(MAX_TICK + 1, 1, 60)]);
        assert!(matches!(build_part_track(&part), Err(MidiExportError::Invalid(_))));
    }
}
