//! MusicXML document emitter
//!
//! Walks a [`Score`] part by part and measure by measure, feeding the
//! [`MusicXmlBuilder`]. Voices of a measure are written one after the other
//! with a `<backup>` to the measure start in between.
//!
//! A note that no single written value fits is split into tied pieces. A note
//! that runs past the bar line is cut there and its remainder opens the same
//! voice in the next measure, tied to it.

use crate::score::{
    notatable_parts, Duration, Event, Measure, Pitch, QuarterLength, Rational, Score, TieType,
    TimeSignature,
};

use super::builder::{divisions, MusicXmlBuilder, NoteLayout, DIVISIONS};

/// Render a score as a MusicXML 3.1 partwise document
pub fn emit_musicxml(score: &Score) -> String {
    let mut builder = MusicXmlBuilder::new();
    builder.set_title(Some(score.metadata.title.clone()));
    builder.set_composer(Some(score.metadata.composer.clone()));

    for part in &score.parts {
        builder.start_part(&part.id, &part.name, &part.instrument);
        let mut state = PartState::default();
        for (index, measure) in part.measures.iter().enumerate() {
            emit_measure(&mut builder, &mut state, measure, index == 0);
        }
        if state.carried.iter().any(|voice| !voice.is_empty()) {
            log::debug!("part '{}' ends inside a tied note, remainder dropped", part.id);
        }
        builder.end_part();
    }

    let xml = builder.finalize();
    log::info!(
        "wrote MusicXML: {} parts, {} measures, {} bytes",
        score.parts.len(),
        score.measure_count(),
        xml.len()
    );
    xml
}

/// Running state while writing one part
#[derive(Default)]
struct PartState {
    time_signature: TimeSignature,
    /// Per voice: notes still sounding from the previous bar
    carried: Vec<Vec<CarriedNote>>,
}

/// Remainder of a note cut at the bar line
#[derive(Debug, Clone)]
struct CarriedNote {
    pitch: Pitch,
    length: QuarterLength,
}

/// One `<note>` as written: a rest, a whole note or a piece of a tied note
#[derive(Debug, Clone)]
struct WrittenNote {
    onset: QuarterLength,
    pitch: Option<Pitch>,
    duration: Duration,
    tie: Option<TieType>,
}

fn emit_measure(builder: &mut MusicXmlBuilder, state: &mut PartState, measure: &Measure, first_measure: bool) {
    builder.start_measure(measure.number, measure.left_barline.as_ref());
    builder.write_attributes(first_measure, measure.time_signature.as_ref());
    if let Some(mark) = measure.tempo {
        builder.write_metronome(mark.bpm);
    }
    if let Some(ts) = measure.time_signature {
        state.time_signature = ts;
    }
    let bar = state.time_signature.bar_quarter_length();

    let voice_count = measure.voices.len().max(state.carried.len());
    state.carried.resize_with(voice_count, Vec::new);

    let mut cursor = 0u64;
    for index in 0..voice_count {
        let carried = std::mem::take(&mut state.carried[index]);
        let events = measure.voices.get(index).map(|v| v.events.as_slice()).unwrap_or(&[]);
        let (written, carry) = layout_voice(&carried, events, bar);
        state.carried[index] = carry;
        if written.is_empty() {
            continue;
        }

        if index > 0 {
            builder.write_backup(cursor);
            cursor = 0;
        }
        // Onset of the last note, for chord detection
        let mut last_onset: Option<u64> = None;

        for note in &written {
            let onset = to_divisions(note.onset);
            let chord = note.pitch.is_some() && last_onset == Some(onset);

            if !chord {
                if onset > cursor {
                    builder.write_forward(onset - cursor);
                } else if onset < cursor {
                    builder.write_backup(cursor - onset);
                }
            }

            match &note.pitch {
                Some(pitch) => {
                    builder.write_note(
                        pitch,
                        NoteLayout {
                            duration: &note.duration,
                            voice: index + 1,
                            chord,
                            tie: note.tie,
                        },
                    );
                    last_onset = Some(onset);
                }
                None => {
                    builder.write_rest(&note.duration, index + 1);
                    last_onset = None;
                }
            }

            if !chord {
                cursor = onset + divisions(&note.duration);
            }
        }
    }

    builder.end_measure(measure.right_barline.as_ref());
}

/// Written notes of one voice in onset order, plus what spills into the next bar
fn layout_voice(
    carried: &[CarriedNote],
    events: &[Event],
    bar: QuarterLength,
) -> (Vec<WrittenNote>, Vec<CarriedNote>) {
    let zero = Rational::from_integer(0);
    let mut written = Vec::new();
    let mut carry = Vec::new();

    for note in carried {
        let inside = note.length.min(bar);
        let spill = note.length - inside;
        written.extend(tied_pieces(note.pitch, zero, inside, true, spill > zero));
        if spill > zero {
            carry.push(CarriedNote {
                pitch: note.pitch,
                length: spill,
            });
        }
    }

    for event in events {
        let offset = event.offset();
        let length = event.duration().quarter_length();
        match event {
            Event::Note(note) if offset < bar && offset + length > bar => {
                let spill = offset + length - bar;
                written.extend(tied_pieces(note.pitch, offset, bar - offset, false, true));
                carry.push(CarriedNote {
                    pitch: note.pitch,
                    length: spill,
                });
            }
            Event::Note(note) if note.duration.is_complex() => {
                written.extend(tied_pieces(note.pitch, offset, length, false, false));
            }
            Event::Note(note) => written.push(WrittenNote {
                onset: offset,
                pitch: Some(note.pitch),
                duration: note.duration.clone(),
                tie: None,
            }),
            Event::Rest(rest) => written.push(WrittenNote {
                onset: offset,
                pitch: None,
                duration: rest.duration.clone(),
                tie: None,
            }),
        }
    }

    // Stable, so chord members stay in voice order
    written.sort_by_key(|note| note.onset);
    (written, carry)
}

/// Pieces of one sounding note, chained by ties
///
/// `tied_in` and `tied_out` say whether the note continues a tie from the
/// previous bar or into the next one.
fn tied_pieces(
    pitch: Pitch,
    onset: QuarterLength,
    length: QuarterLength,
    tied_in: bool,
    tied_out: bool,
) -> Vec<WrittenNote> {
    let parts = notatable_parts(length);
    let last = parts.len().saturating_sub(1);
    let mut onset = onset;
    let mut pieces = Vec::with_capacity(parts.len());

    for (index, duration) in parts.into_iter().enumerate() {
        let stops = index > 0 || tied_in;
        let starts = index < last || tied_out;
        let tie = match (stops, starts) {
            (false, false) => None,
            (false, true) => Some(TieType::Start),
            (true, true) => Some(TieType::Continue),
            (true, false) => Some(TieType::Stop),
        };
        let next = onset + duration.quarter_length();
        pieces.push(WrittenNote {
            onset,
            pitch: Some(pitch),
            duration,
            tie,
        });
        onset = next;
    }
    pieces
}

fn to_divisions(offset: QuarterLength) -> u64 {
    let divs = (offset * DIVISIONS as i64).round().to_integer();
    divs.max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{
        Duration, DurationType, Instrument, Metadata, MetronomeMark, NoteEvent, Part, Pitch,
        Rational, RestEvent, TieData, TimeSignature, Voice,
    };

    fn note(id: usize, offset: i64, midi: u8) -> Event {
        Event::Note(NoteEvent {
            id,
            offset: Rational::from_integer(offset),
            pitch: Pitch::new(midi),
            duration: Duration::new(DurationType::Quarter, 0),
            tie: None,
            string: 1,
        })
    }

    fn score_with(measure: Measure) -> Score {
        let mut part = Part::new("Guitar_0", "Guitar", Instrument::pitched("Guitar", 25));
        part.measures.push(measure);
        let mut score = Score::new(Metadata {
            title: "Test".to_string(),
            composer: "Tester".to_string(),
        });
        score.parts.push(part);
        score
    }

    #[test]
    fn test_chord_notes_share_onset() {
        let mut measure = Measure::new("m1", 1);
        let mut voice = Voice::new("voice_0");
        voice.insert(note(0, 0, 60));
        voice.insert(note(1, 0, 64));
        voice.insert(note(2, 1, 67));
        measure.insert_voice(voice);

        let xml = emit_musicxml(&score_with(measure));
        assert_eq!(xml.matches("<chord/>").count(), 1);
        assert!(!xml.contains("<forward>"));
    }

    #[test]
    fn test_backup_between_voices() {
        let mut measure = Measure::new("m1", 1);
        measure.time_signature = Some(TimeSignature::new(2, 4));
        let mut upper = Voice::new("voice_0");
        upper.insert(note(0, 0, 72));
        upper.insert(note(1, 1, 74));
        let mut lower = Voice::new("voice_1");
        lower.insert(Event::Rest(RestEvent {
            offset: Rational::from_integer(0),
            duration: Duration::new(DurationType::Half, 0),
        }));
        measure.insert_voice(upper);
        measure.insert_voice(lower);

        let xml = emit_musicxml(&score_with(measure));
        assert!(xml.contains("<backup><duration>1920</duration></backup>"));
        assert!(xml.contains("<voice>2</voice>"));
        assert!(xml.contains("<beats>2</beats>"));
    }

    #[test]
    fn test_gap_becomes_forward() {
        let mut measure = Measure::new("m1", 1);
        let mut voice = Voice::new("voice_0");
        voice.insert(note(0, 2, 60));
        measure.insert_voice(voice);

        let xml = emit_musicxml(&score_with(measure));
        assert!(xml.contains("<forward><duration>1920</duration></forward>"));
    }

    fn long_note(offset: i64, length: QuarterLength) -> Event {
        Event::Note(NoteEvent {
            id: 0,
            offset: Rational::from_integer(offset),
            pitch: Pitch::new(64),
            duration: Duration::from_quarter_length(length),
            tie: Some(TieData { type_: TieType::Start }),
            string: 1,
        })
    }

    #[test]
    fn test_single_value_note_has_no_tie() {
        let mut measure = Measure::new("m1", 1);
        let mut voice = Voice::new("voice_0");
        voice.insert(long_note(0, Rational::from_integer(2)));
        measure.insert_voice(voice);

        let xml = emit_musicxml(&score_with(measure));
        assert!(xml.contains("<type>half</type>"));
        assert!(!xml.contains("<tie "));
        assert!(!xml.contains("<tied "));
    }

    #[test]
    fn test_complex_note_written_as_tied_pieces() {
        let mut measure = Measure::new("m1", 1);
        let mut voice = Voice::new("voice_0");
        voice.insert(long_note(0, Rational::new(5, 4)));
        measure.insert_voice(voice);

        let xml = emit_musicxml(&score_with(measure));
        assert_eq!(xml.matches("<note>").count(), 2);
        assert!(xml.contains("<duration>960</duration>"));
        assert!(xml.contains("<duration>240</duration>"));
        assert!(xml.contains("<type>16th</type>"));
        assert_eq!(xml.matches("<tie type=\"start\"/>").count(), 1);
        assert_eq!(xml.matches("<tie type=\"stop\"/>").count(), 1);
    }

    #[test]
    fn test_note_past_bar_line_continues_in_next_measure() {
        let mut first = Measure::new("m1", 1);
        first.time_signature = Some(TimeSignature::new(4, 4));
        let mut voice = Voice::new("voice_0");
        voice.insert(long_note(2, Rational::from_integer(3)));
        first.insert_voice(voice);

        let mut score = score_with(first);
        score.parts[0].measures.push(Measure::new("m2", 2));
        let xml = emit_musicxml(&score);

        let second = &xml[xml.find("<measure number=\"2\">").unwrap()..];
        assert!(second.contains("<duration>960</duration>"));
        assert!(second.contains("<tie type=\"stop\"/>"));
        assert!(!second.contains("<tie type=\"start\"/>"));
        assert!(xml.contains("<forward><duration>1920</duration></forward>"));
        assert!(xml[..xml.find("<measure number=\"2\">").unwrap()].contains("<type>half</type>"));
        assert_eq!(xml.matches("<tie type=\"start\"/>").count(), 1);
        assert_eq!(xml.matches("<tie type=\"stop\"/>").count(), 1);
    }

    #[test]
    fn test_metronome_and_header() {
        let mut measure = Measure::new("m1", 1);
        measure.tempo = Some(MetronomeMark::new(70.0));
        let xml = emit_musicxml(&score_with(measure));
        assert!(xml.contains("<per-minute>70</per-minute>"));
        assert!(xml.contains("<sound tempo=\"70\"/>"));
        assert!(xml.contains("<movement-title>Test</movement-title>"));
        assert!(xml.contains("<creator type=\"composer\">Tester</creator>"));
        assert!(xml.contains("<divisions>960</divisions>"));
        assert!(xml.contains("<midi-program>26</midi-program>"));
    }
}
