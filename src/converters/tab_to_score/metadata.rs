//! Song metadata extraction

use serde::{Deserialize, Serialize};

use crate::models::Song;
use crate::score::Metadata;

/// Title, artist and tempo read from a tab song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongMetadata {
    pub title: String,
    pub artist: String,
    /// Beats per minute
    pub tempo: f64,
}

pub fn extract_metadata(song: &Song) -> SongMetadata {
    SongMetadata {
        title: song.title.clone().unwrap_or_default(),
        artist: song.artist.clone().unwrap_or_default(),
        tempo: song.tempo,
    }
}

/// Title without the file-extension-like suffix tab files often carry
///
/// Everything from the first `.` on is dropped: "Engano.gp4" -> "Engano".
pub fn score_title(title: &str) -> &str {
    title.split('.').next().unwrap_or_default()
}

impl SongMetadata {
    /// Score metadata: trimmed title, artist as composer
    pub fn to_score_metadata(&self) -> Metadata {
        Metadata {
            title: score_title(&self.title).to_string(),
            composer: self.artist.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_metadata() {
        let song = Song::new(
            "Antonio Carlos, Jobim - Engano.gp4",
            "Antonio Carlos, Jobim",
            70.0,
        );
        let metadata = extract_metadata(&song);
        assert_eq!(metadata.title, "Antonio Carlos, Jobim - Engano.gp4");
        assert_eq!(metadata.artist, "Antonio Carlos, Jobim");
        assert_eq!(metadata.tempo, 70.0);
    }

    #[test]
    fn test_score_metadata() {
        let metadata = SongMetadata {
            title: "Antonio Carlos, Jobim - Engano.gp4".to_string(),
            artist: "Antonio Carlos, Jobim".to_string(),
            tempo: 70.0,
        };
        let score = metadata.to_score_metadata();
        assert_eq!(score.title, "Antonio Carlos, Jobim - Engano");
        assert_eq!(score.composer, "Antonio Carlos, Jobim");
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let mut song = Song::new("", "", 120.0);
        song.title = None;
        song.artist = None;
        let metadata = extract_metadata(&song);
        assert_eq!(metadata.title, "");
        assert_eq!(metadata.artist, "");
    }

    #[test]
    fn test_score_title() {
        assert_eq!(score_title("song.gp5"), "song");
        assert_eq!(score_title("a.b.c"), "a");
        assert_eq!(score_title("no suffix"), "no suffix");
        assert_eq!(score_title(".hidden"), "");
    }
}
