// Loading songs and writing scores through the serializers

use std::fs;

use tab2score::converters::tab_to_score::convert_song;
use tab2score::models::{Beat, Duration, Measure, Note, NoteType, Song, TimeSignature, Track, Voice};
use tab2score::serialization::{
    ScoreFormat, ScoreSerializer, SerializationError, Serializer, TabSerializer,
};

fn small_song() -> Song {
    let mut song = Song::new("Small.gp5", "Tester", 100.0);
    let mut track = Track::new("Guitar", 25);
    let mut measure = Measure::new(TimeSignature::new(4, 4));
    measure.voices.push(Voice::new(vec![
        Beat::new(0, Duration::new(Duration::HALF)).with_notes(vec![Note::new(1, 64)]),
        Beat::new(1920, Duration::new(Duration::QUARTER)).with_notes(vec![Note::tie(1, 64)]),
    ]));
    track.measures.push(measure);
    song.tracks.push(track);
    song
}

#[test]
fn test_song_survives_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.json");
    let song = small_song();

    TabSerializer.dump(&song, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"type\": 2"), "note types are written as their numeric codes");

    let loaded = TabSerializer.load(&path).unwrap();
    assert_eq!(loaded, song);
    assert_eq!(loaded.tracks[0].measures[0].voices[0].beats[1].notes[0].kind, NoteType::Tie);
}

#[test]
fn test_loaded_song_converts() {
    let json = r#"{
        "title": "Loaded.gp4",
        "artist": "Someone",
        "tempo": 80.0,
        "tracks": [{
            "name": "Lead",
            "instrument": 27,
            "measures": [{
                "time_signature": {"numerator": 2, "denominator": 4},
                "repeat_open": true,
                "voices": [{"beats": [
                    {"start": 0, "duration": {"value": 4}, "notes": [{"string": 1, "real_value": 64}]},
                    {"start": 960, "duration": {"value": 4}, "status": 2}
                ]}]
            }]
        }]
    }"#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loaded.json");
    fs::write(&path, json).unwrap();

    let song = TabSerializer.load(&path).unwrap();
    let result = convert_song(&song).unwrap();
    let measure = &result.score.parts[0].measures[0];
    assert_eq!(result.score.metadata.title, "Loaded");
    assert_eq!(measure.voices[0].notes().count(), 1);
    assert_eq!(measure.voices[0].rests().count(), 1);
    assert!(measure.left_barline.is_some());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = TabSerializer.load(&dir.path().join("missing.json"));
    assert!(matches!(result, Err(SerializationError::Io(_))));
}

#[test]
fn test_score_dump_in_every_format() {
    let score = convert_song(&small_song()).unwrap().score;
    let dir = tempfile::tempdir().unwrap();

    for format in [ScoreFormat::Midi, ScoreFormat::MusicXml, ScoreFormat::Json] {
        let path = dir.path().join(format!("small.{}", format.extension()));
        ScoreSerializer::new(format).dump(&score, &path).unwrap();
        assert_eq!(ScoreFormat::from_path(&path), Some(format));

        let bytes = fs::read(&path).unwrap();
        match format {
            ScoreFormat::Midi => assert_eq!(&bytes[0..4], b"MThd"),
            ScoreFormat::MusicXml => assert!(bytes.starts_with(b"<?xml")),
            ScoreFormat::Json => assert_eq!(bytes[0], b'{'),
        }
    }
}

#[test]
fn test_score_json_loads_back() {
    let score = convert_song(&small_song()).unwrap().score;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("score.json");
    let serializer = ScoreSerializer::new(ScoreFormat::Json);

    serializer.dump(&score, &path).unwrap();
    assert_eq!(serializer.load(&path).unwrap(), score);
}

#[test]
fn test_only_json_scores_load() {
    let score = convert_song(&small_song()).unwrap().score;
    let dir = tempfile::tempdir().unwrap();

    for format in [ScoreFormat::Midi, ScoreFormat::MusicXml] {
        let path = dir.path().join(format!("score.{}", format.extension()));
        let serializer = ScoreSerializer::new(format);
        serializer.dump(&score, &path).unwrap();

        let err = serializer.load(&path).unwrap_err();
        assert!(matches!(err, SerializationError::UnsupportedLoad(f) if f == format));
        assert!(err.to_string().contains("not supported"));
    }
}
