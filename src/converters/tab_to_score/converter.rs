//! Tab song -> score walk
//!
//! Single pass over tracks, measures, voices, beats and notes. The score is
//! built in lockstep: track -> part, measure -> measure, voice -> voice,
//! beat -> notes/rests. Running state (time signature, tie table, tempo mark)
//! lives on the converter and is only touched by `apply`.

use crate::diagnostics::{DiagnosticMark, Diagnostics, SourceLocation};
use crate::models::{self, NoteType, Song};
use crate::score::{
    Barline, Event, Instrument, Measure, MetronomeMark, NoteEvent, Part, Pitch, RestEvent, Score,
    TieData, TieType, TimeSignature, Voice,
};
use crate::utils::{program_name, PERCUSSION_CHANNEL};

use super::errors::{ConversionError, Result};
use super::metadata::{extract_metadata, SongMetadata};
use super::ties::{tie_extension, TieTable, TiedNote};
use super::timing::{
    beat_duration, duration_from_ticks, measure_duration_in_ticks, score_time_signature,
    ticks_to_quarter_length, trailing_rest,
};
use super::ConversionResult;

/// Converts one tab song into a score
pub struct Converter<'a> {
    song: &'a Song,
    metadata: SongMetadata,
    score: Score,
    tempo: MetronomeMark,
    time_signature: TimeSignature,
    ties: TieTable,
    diagnostics: Diagnostics,
    next_note_id: usize,
}

impl<'a> Converter<'a> {
    /// Prepare a conversion; fails if the song has no tracks or no positive tempo
    pub fn new(song: &'a Song) -> Result<Self> {
        if song.tracks.is_empty() {
            return Err(ConversionError::InvalidInput("song has no tracks".to_string()));
        }
        if !(song.tempo.is_finite() && song.tempo > 0.0) {
            return Err(ConversionError::InvalidInput(format!(
                "tempo must be a positive number of beats per minute, got {}",
                song.tempo
            )));
        }

        let metadata = extract_metadata(song);
        let score = Score::new(metadata.to_score_metadata());
        let tempo = MetronomeMark::new(metadata.tempo);

        Ok(Converter {
            song,
            metadata,
            score,
            tempo,
            time_signature: TimeSignature::default(),
            ties: TieTable::new(),
            diagnostics: Diagnostics::new(),
            next_note_id: 0,
        })
    }

    pub fn metadata(&self) -> &SongMetadata {
        &self.metadata
    }

    /// Score as built so far (only metadata before `apply`)
    pub fn score(&self) -> &Score {
        &self.score
    }

    /// Walk the whole song and hand over the finished score
    pub fn apply(mut self) -> ConversionResult {
        let song = self.song;
        for (track_index, track) in song.tracks.iter().enumerate() {
            log::debug!(
                "converting track {} '{}' ({} measures)",
                track_index,
                track.name,
                track.measures.len()
            );
            // Ties never reach across tracks
            self.ties.clear();

            let mut part = build_part(track_index, track);
            for (measure_index, measure) in track.measures.iter().enumerate() {
                let built = self.convert_measure(&part, track_index, measure_index, measure);
                let built = self.fill_measure(&mut part, built, track_index, measure_index, measure);
                part.measures.push(built);
            }
            self.score.parts.push(part);
        }

        let event_count: usize = self
            .score
            .parts
            .iter()
            .flat_map(|p| &p.measures)
            .flat_map(|m| &m.voices)
            .map(|v| v.events.len())
            .sum();
        log::info!(
            "converted '{}': {} parts, {} measures, {} events, {} diagnostics",
            self.score.metadata.title,
            self.score.parts.len(),
            self.score.measure_count(),
            event_count,
            self.diagnostics.len()
        );

        ConversionResult {
            score: self.score,
            diagnostics: self.diagnostics,
        }
    }

    /// Measure shell: id, time signature, tempo mark, repeat barlines
    fn convert_measure(
        &mut self,
        part: &Part,
        track_index: usize,
        measure_index: usize,
        measure: &models::Measure,
    ) -> Measure {
        let mut built = Measure::new(format!("{}_m{}", part.id, measure_index + 1), measure_index + 1);

        let (ts, clamped) = score_time_signature(&measure.time_signature);
        if clamped {
            self.diagnostics.report(DiagnosticMark::warning(
                SourceLocation::measure(track_index, measure_index),
                "clamped_time_signature",
                format!(
                    "time signature {}/{} has a zero part, using {}",
                    measure.time_signature.numerator, measure.time_signature.denominator, ts
                ),
            ));
        }

        if track_index == 0 && measure_index == 0 {
            built.tempo = Some(self.tempo);
        }
        if measure_index == 0 || ts != self.time_signature {
            built.time_signature = Some(ts);
            self.time_signature = ts;
        }

        if measure.repeat_open {
            built.left_barline = Some(Barline::start_repeat());
        }
        if measure.repeat_close > 0 {
            built.right_barline = Some(Barline::end_repeat(measure.repeat_close as u32));
        }

        built
    }

    /// Fill a measure shell with its voices
    fn fill_measure(
        &mut self,
        part: &mut Part,
        mut built: Measure,
        track_index: usize,
        measure_index: usize,
        measure: &models::Measure,
    ) -> Measure {
        // Signature of this measure, annotated or not
        let (ts, _) = score_time_signature(&measure.time_signature);

        for (voice_index, voice) in measure.voices.iter().enumerate() {
            if voice.is_empty() {
                continue;
            }
            let slot = built.insert_voice(Voice::new(format!("voice_{}", voice_index)));
            let context = WalkContext {
                track_index,
                measure_index,
                voice_index,
                slot,
            };

            for (beat_index, beat) in voice.beats.iter().enumerate() {
                self.convert_beat(part, &mut built, &context, beat_index, beat);
            }

            if let Some(last) = voice.beats.last() {
                match trailing_rest(&ts, last) {
                    Some(rest) => built.voices[slot].append(Event::Rest(rest)),
                    None => {
                        let consumed = last.start as u64 + last.duration.ticks() as u64;
                        let declared = measure_duration_in_ticks(&ts);
                        if consumed as i64 > declared {
                            self.diagnostics.report(DiagnosticMark::warning(
                                SourceLocation::measure(track_index, measure_index),
                                "overfull_measure",
                                format!(
                                    "voice {} runs to tick {} in a {} tick measure",
                                    voice_index, consumed, declared
                                ),
                            ));
                        }
                    }
                }
            }
        }

        built
    }

    fn convert_beat(
        &mut self,
        part: &mut Part,
        measure: &mut Measure,
        context: &WalkContext,
        beat_index: usize,
        beat: &models::Beat,
    ) {
        let location = context.location(beat_index);
        let offset = ticks_to_quarter_length(beat.start as i64);

        if let Some(bpm) = beat.tempo_change() {
            self.apply_tempo_change(measure, bpm, location);
        }

        if beat.notes.is_empty() {
            let rest = RestEvent {
                offset,
                duration: self.beat_duration(beat, location),
            };
            measure.voices[context.slot].insert(Event::Rest(rest));
            return;
        }

        for note in &beat.notes {
            let event = self.build_event(beat, note, location);
            match (note.kind, event) {
                (NoteType::Tie, Event::Note(tie_note)) => {
                    self.resolve_tie(part, measure, context, tie_note, location);
                }
                (NoteType::Normal, Event::Note(new_note)) => {
                    self.ties.record(
                        note.string,
                        TiedNote {
                            measure_index: context.measure_index,
                            voice_index: context.slot,
                            note_id: new_note.id,
                        },
                    );
                    measure.voices[context.slot].insert(Event::Note(new_note));
                }
                (_, event) => measure.voices[context.slot].insert(event),
            }
        }
    }

    /// Replace the measure's tempo mark; changes apply from the measure start
    fn apply_tempo_change(&mut self, measure: &mut Measure, bpm: f64, location: SourceLocation) {
        if !(bpm.is_finite() && bpm > 0.0) {
            self.diagnostics.report(DiagnosticMark::warning(
                location,
                "invalid_tempo_change",
                format!("ignoring tempo change to {}", bpm),
            ));
            return;
        }
        let previous = measure.replace_tempo(MetronomeMark::new(bpm));
        log::debug!(
            "tempo change to {} bpm at {} (replaces {:?})",
            bpm,
            location,
            previous.map(|mark| mark.bpm)
        );
    }

    /// Note or rest for one tab note, positioned at its beat
    fn build_event(&mut self, beat: &models::Beat, note: &models::Note, location: SourceLocation) -> Event {
        let offset = ticks_to_quarter_length(beat.start as i64);
        let duration = self.beat_duration(beat, location);

        match note.kind {
            NoteType::Normal | NoteType::Tie => {
                let id = self.next_note_id;
                self.next_note_id += 1;
                Event::Note(NoteEvent {
                    id,
                    offset,
                    pitch: Pitch::new(note.real_value),
                    duration,
                    tie: None,
                    string: note.string,
                })
            }
            NoteType::Dead | NoteType::Rest => {
                self.diagnostics.report(DiagnosticMark::warning(
                    location,
                    "unsupported_note_type",
                    format!("{:?} note on string {} rendered as a rest", note.kind, note.string),
                ));
                Event::Rest(RestEvent { offset, duration })
            }
        }
    }

    fn beat_duration(&mut self, beat: &models::Beat, location: SourceLocation) -> crate::score::Duration {
        match beat_duration(&beat.duration) {
            Some(duration) => duration,
            None => {
                self.diagnostics.report(DiagnosticMark::warning(
                    location,
                    "unknown_duration_value",
                    format!(
                        "note value {} is not a supported power of two, using its tick length",
                        beat.duration.value
                    ),
                ));
                duration_from_ticks(beat.duration.ticks() as i64)
            }
        }
    }

    /// Fold a tie note into the last normal note on its string
    fn resolve_tie(
        &mut self,
        part: &mut Part,
        measure: &mut Measure,
        context: &WalkContext,
        mut tie_note: NoteEvent,
        location: SourceLocation,
    ) {
        let Some(recorded) = self.ties.get(tie_note.string) else {
            self.diagnostics.report(DiagnosticMark::warning(
                location,
                "orphan_tie",
                format!("tie on string {} has no previous note, dropped", tie_note.string),
            ));
            return;
        };

        let same_measure = recorded.measure_index == context.measure_index;
        let target = if same_measure {
            measure.voices.get_mut(recorded.voice_index)
        } else {
            part.measures
                .get_mut(recorded.measure_index)
                .and_then(|m| m.voices.get_mut(recorded.voice_index))
        }
        .and_then(|voice| voice.note_mut(recorded.note_id));

        let Some(previous) = target else {
            self.diagnostics.report(DiagnosticMark::warning(
                location,
                "orphan_tie",
                format!("tie on string {} lost its previous note, dropped", tie_note.string),
            ));
            return;
        };

        tie_note.pitch = previous.pitch;
        let extension = tie_extension(
            previous.offset,
            previous.duration.quarter_length(),
            tie_note.offset,
            tie_note.duration.quarter_length(),
            same_measure,
        );
        previous.duration.extend(extension);
        previous.tie = Some(TieData { type_: TieType::Start });
        log::debug!(
            "tie on string {} at {} extends {} by {}",
            tie_note.string,
            location,
            tie_note.pitch,
            extension
        );
    }
}

/// Where in the song the walk currently is
struct WalkContext {
    track_index: usize,
    measure_index: usize,
    voice_index: usize,
    /// Index of the voice within the score measure (empty voices are skipped)
    slot: usize,
}

impl WalkContext {
    fn location(&self, beat_index: usize) -> SourceLocation {
        SourceLocation::beat(self.track_index, self.measure_index, self.voice_index, beat_index)
    }
}

/// Part for a track; percussion tracks get an unpitched instrument on channel 10
fn build_part(track_index: usize, track: &models::Track) -> Part {
    let instrument = if track.is_percussion {
        Instrument::unpitched_percussion(PERCUSSION_CHANNEL)
    } else {
        Instrument::pitched(program_name(track.instrument), track.instrument)
    };
    Part::new(part_id(&track.name, track_index), track.name.clone(), instrument)
}

/// Stable part id from the track name and index ("Lead_Guitar_0")
pub fn part_id(name: &str, index: usize) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if slug.is_empty() {
        format!("track_{}", index)
    } else {
        format!("{}_{}", slug, index)
    }
}
