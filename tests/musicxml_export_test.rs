// MusicXML export of converted songs

use tab2score::converters::tab_to_score::convert_song;
use tab2score::models::{Beat, Duration, Measure, Note, Song, TimeSignature, Track, Tuplet, Voice};
use tab2score::renderers::musicxml::emit_musicxml;

fn measure(numerator: u32, denominator: u32, beats: Vec<Beat>) -> Measure {
    let mut measure = Measure::new(TimeSignature::new(numerator, denominator));
    measure.voices.push(Voice::new(beats));
    measure
}

fn to_musicxml(song: &Song) -> String {
    let score = convert_song(song).expect("conversion should succeed").score;
    emit_musicxml(&score)
}

fn one_track(title: &str, measures: Vec<Measure>) -> Song {
    let mut song = Song::new(title, "Antonio Carlos, Jobim", 70.0);
    let mut track = Track::new("Nylon Guitar", 24);
    track.measures = measures;
    song.tracks.push(track);
    song
}

#[test]
fn test_header_and_part_list() {
    let song = one_track(
        "Antonio Carlos, Jobim - Engano.gp4",
        vec![measure(4, 4, vec![Beat::new(0, Duration::new(Duration::WHOLE)).with_notes(vec![Note::new(1, 64)])])],
    );
    let xml = to_musicxml(&song);

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<movement-title>Antonio Carlos, Jobim - Engano</movement-title>"));
    assert!(xml.contains("<creator type=\"composer\">Antonio Carlos, Jobim</creator>"));
    assert!(xml.contains("<score-part id=\"Nylon_Guitar_0\">"));
    assert!(xml.contains("<part-name>Nylon Guitar</part-name>"));
    assert!(xml.contains("<instrument-name>Acoustic Guitar (nylon)</instrument-name>"));
    assert!(xml.contains("<midi-program>25</midi-program>"));
    assert!(xml.contains("<part id=\"Nylon_Guitar_0\">"));
    assert!(xml.trim_end().ends_with("</score-partwise>"));
}

#[test]
fn test_first_measure_attributes_and_tempo() {
    let song = one_track(
        "Song",
        vec![
            measure(3, 4, vec![Beat::new(0, Duration::dotted(Duration::HALF)).with_notes(vec![Note::new(1, 64)])]),
            measure(3, 4, vec![Beat::new(0, Duration::dotted(Duration::HALF)).with_notes(vec![Note::new(1, 65)])]),
        ],
    );
    let xml = to_musicxml(&song);

    assert_eq!(xml.matches("<attributes>").count(), 1, "unchanged meter is written once");
    assert!(xml.contains("<divisions>960</divisions>"));
    assert!(xml.contains("<beats>3</beats><beat-type>4</beat-type>"));
    assert_eq!(xml.matches("<metronome>").count(), 1);
    assert!(xml.contains("<per-minute>70</per-minute>"));
    assert!(xml.contains("<type>half</type>\n        <dot/>"));
    assert!(xml.contains("<duration>2880</duration>"));
}

fn tie_counts(xml: &str) -> (usize, usize) {
    (xml.matches("<tie type=\"start\"/>").count(), xml.matches("<tie type=\"stop\"/>").count())
}

#[test]
fn test_trailing_rest_after_merged_tie() {
    let song = one_track(
        "Song",
        vec![measure(4, 4, vec![
            Beat::new(0, Duration::new(Duration::EIGHTH)).with_notes(vec![Note::new(2, 59)]),
            Beat::new(480, Duration::new(Duration::EIGHTH)).with_notes(vec![Note::tie(2, 59)]),
        ])],
    );
    let xml = to_musicxml(&song);

    assert_eq!(xml.matches("<note>").count(), 2, "merged note plus trailing rest");
    assert!(xml.contains("<step>B</step>"));
    assert!(xml.contains("<octave>3</octave>"));
    assert!(xml.contains("<type>quarter</type>"));
    assert_eq!(tie_counts(&xml), (0, 0), "one written value needs no tie");
    assert!(xml.contains("<rest/>"));
    assert!(xml.contains("<duration>2880</duration>"));
}

#[test]
fn test_merged_tie_does_not_reach_next_note() {
    let song = one_track(
        "Song",
        vec![measure(4, 4, vec![
            Beat::new(0, Duration::new(Duration::QUARTER)).with_notes(vec![Note::new(1, 64)]),
            Beat::new(960, Duration::new(Duration::QUARTER)).with_notes(vec![Note::tie(1, 64)]),
            Beat::new(1920, Duration::new(Duration::HALF)).with_notes(vec![Note::new(1, 64)]),
        ])],
    );
    let xml = to_musicxml(&song);

    assert_eq!(xml.matches("<note>").count(), 2);
    assert_eq!(xml.matches("<type>half</type>").count(), 2);
    let (starts, stops) = tie_counts(&xml);
    assert_eq!(starts, stops);
}

#[test]
fn test_uneven_tie_is_written_as_tied_values() {
    let song = one_track(
        "Song",
        vec![measure(4, 4, vec![
            Beat::new(0, Duration::new(Duration::QUARTER)).with_notes(vec![Note::new(1, 64)]),
            Beat::new(960, Duration::new(Duration::SIXTEENTH)).with_notes(vec![Note::tie(1, 64)]),
        ])],
    );
    let xml = to_musicxml(&song);

    assert!(xml.contains("<type>quarter</type>"));
    assert!(xml.contains("<type>16th</type>"));
    assert_eq!(tie_counts(&xml), (1, 1));
    assert_eq!(xml.matches("<tied type=\"stop\"/>").count(), 1);
}

#[test]
fn test_tie_across_bar_line_keeps_bars_full() {
    let song = one_track(
        "Song",
        vec![
            measure(4, 4, vec![
                Beat::new(0, Duration::new(Duration::HALF)).with_notes(vec![Note::new(2, 59)]),
                Beat::new(1920, Duration::new(Duration::HALF)).with_notes(vec![Note::new(2, 60)]),
            ]),
            measure(4, 4, vec![
                Beat::new(0, Duration::new(Duration::QUARTER)).with_notes(vec![Note::tie(2, 60)]),
                Beat::new(960, Duration::new(Duration::QUARTER)).with_notes(vec![Note::new(2, 62)]),
            ]),
        ],
    );
    let xml = to_musicxml(&song);
    let split = xml.find("<measure number=\"2\">").expect("second measure");
    let (first, second) = xml.split_at(split);

    assert_eq!(first.matches("<type>half</type>").count(), 2, "first bar holds exactly two halves");
    assert_eq!(tie_counts(first), (1, 0));
    assert_eq!(tie_counts(second), (0, 1));
    assert!(second.contains("<step>C</step>"));
    assert!(second.contains("<step>D</step>"));
    assert!(!second.contains("<forward>"));
}

#[test]
fn test_triplets_write_time_modification() {
    let triplet = Duration::new(Duration::EIGHTH).with_tuplet(Tuplet::new(3, 2));
    let song = one_track(
        "Song",
        vec![measure(1, 4, vec![
            Beat::new(0, triplet).with_notes(vec![Note::new(1, 64)]),
            Beat::new(320, triplet).with_notes(vec![Note::new(1, 65)]),
            Beat::new(640, triplet).with_notes(vec![Note::new(1, 67)]),
        ])],
    );
    let xml = to_musicxml(&song);

    assert_eq!(xml.matches("<time-modification>").count(), 3);
    assert_eq!(xml.matches("<duration>320</duration>").count(), 3);
    assert_eq!(xml.matches("<type>eighth</type>").count(), 3);
}

#[test]
fn test_repeats_and_percussion() {
    let mut open = measure(4, 4, vec![Beat::new(0, Duration::new(Duration::WHOLE)).with_notes(vec![Note::new(1, 36)])]);
    open.repeat_open = true;
    open.repeat_close = 2;

    let mut song = Song::new("Beat", "Drummer", 100.0);
    let mut drums = Track::percussion("Drums");
    drums.measures.push(open);
    song.tracks.push(drums);
    let xml = to_musicxml(&song);

    assert!(xml.contains("<barline location=\"left\">"));
    assert!(xml.contains("<repeat direction=\"forward\"/>"));
    assert!(xml.contains("<repeat direction=\"backward\" times=\"2\"/>"));
    assert!(xml.contains("<sign>percussion</sign>"));
    assert!(xml.contains("<instrument-name>Percussion</instrument-name>"));
    assert!(xml.contains("<unpitched>"));
    assert!(!xml.contains("<pitch>"));
}

#[test]
fn test_names_are_escaped() {
    let mut song = one_track("Rock & Roll.gp5", vec![]);
    song.tracks[0].name = "Lead <1>".to_string();
    let xml = to_musicxml(&song);
    assert!(xml.contains("<movement-title>Rock &amp; Roll</movement-title>"));
    assert!(xml.contains("<part-name>Lead &lt;1&gt;</part-name>"));
}
