//! Loading and saving songs and scores
//!
//! Both sides of a conversion go through a [`Serializer`]: tab songs are read
//! from and written to JSON, scores are written as MIDI, MusicXML or JSON.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Song;
use crate::renderers::midi::{score_to_smf, MidiExportError, MidiExportSettings};
use crate::renderers::musicxml::emit_musicxml;
use crate::score::Score;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Midi(#[from] MidiExportError),
    #[error("loading {0} scores is not supported")]
    UnsupportedLoad(ScoreFormat),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

/// Reads and writes one kind of document
pub trait Serializer {
    type Item;

    fn dump(&self, item: &Self::Item, path: &Path) -> Result<()>;

    fn load(&self, path: &Path) -> Result<Self::Item>;
}

/// Tab songs as JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct TabSerializer;

impl TabSerializer {
    pub fn from_json(&self, json: &str) -> Result<Song> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self, song: &Song) -> Result<String> {
        Ok(serde_json::to_string_pretty(song)?)
    }
}

impl Serializer for TabSerializer {
    type Item = Song;

    fn dump(&self, song: &Song, path: &Path) -> Result<()> {
        fs::write(path, self.to_json(song)?)?;
        log::debug!("wrote song to {}", path.display());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Song> {
        let song = self.from_json(&fs::read_to_string(path)?)?;
        log::debug!(
            "loaded song from {}: {} tracks",
            path.display(),
            song.tracks.len()
        );
        Ok(song)
    }
}

/// Output formats for scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreFormat {
    Midi,
    MusicXml,
    Json,
}

impl ScoreFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ScoreFormat::Midi => "mid",
            ScoreFormat::MusicXml => "musicxml",
            ScoreFormat::Json => "json",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "mid" | "midi" => Some(ScoreFormat::Midi),
            "musicxml" | "xml" => Some(ScoreFormat::MusicXml),
            "json" => Some(ScoreFormat::Json),
            _ => None,
        }
    }
}

impl fmt::Display for ScoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoreFormat::Midi => "MIDI",
            ScoreFormat::MusicXml => "MusicXML",
            ScoreFormat::Json => "JSON",
        };
        f.write_str(name)
    }
}

/// Scores in one of the [`ScoreFormat`]s
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSerializer {
    pub format: ScoreFormat,
    #[serde(default)]
    pub midi: MidiExportSettings,
}

impl ScoreSerializer {
    pub fn new(format: ScoreFormat) -> Self {
        ScoreSerializer {
            format,
            midi: MidiExportSettings::default(),
        }
    }

    pub fn with_midi_settings(mut self, midi: MidiExportSettings) -> Self {
        self.midi = midi;
        self
    }

    /// Render a score in memory
    pub fn to_bytes(&self, score: &Score) -> Result<Vec<u8>> {
        match self.format {
            ScoreFormat::Midi => Ok(score_to_smf(score, &self.midi)?),
            ScoreFormat::MusicXml => Ok(emit_musicxml(score).into_bytes()),
            ScoreFormat::Json => Ok(serde_json::to_vec_pretty(score)?),
        }
    }
}

impl Serializer for ScoreSerializer {
    type Item = Score;

    fn dump(&self, score: &Score, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes(score)?)?;
        log::debug!("wrote {} score to {}", self.format, path.display());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Score> {
        match self.format {
            ScoreFormat::Json => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
            format => Err(SerializationError::UnsupportedLoad(format)),
        }
    }
}
