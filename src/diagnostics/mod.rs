//! Conversion diagnostics
//!
//! Non-fatal problems found while converting a song. Each mark is logged when
//! raised and also collected, so callers can report what was degraded or
//! dropped without scraping logs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for diagnostic marks
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// Position in the source song a diagnostic refers to
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub track: usize,
    pub measure: usize,
    pub voice: Option<usize>,
    pub beat: Option<usize>,
}

impl SourceLocation {
    pub fn measure(track: usize, measure: usize) -> Self {
        SourceLocation {
            track,
            measure,
            voice: None,
            beat: None,
        }
    }

    pub fn beat(track: usize, measure: usize, voice: usize, beat: usize) -> Self {
        SourceLocation {
            track,
            measure,
            voice: Some(voice),
            beat: Some(beat),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track {} measure {}", self.track, self.measure)?;
        if let Some(voice) = self.voice {
            write!(f, " voice {}", voice)?;
        }
        if let Some(beat) = self.beat {
            write!(f, " beat {}", beat)?;
        }
        Ok(())
    }
}

/// A diagnostic mark for a single issue
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DiagnosticMark {
    pub location: SourceLocation,
    pub severity: DiagnosticSeverity,
    /// Kind identifier (e.g. "orphan_tie", "unsupported_note_type")
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

impl DiagnosticMark {
    pub fn new(
        location: SourceLocation,
        severity: DiagnosticSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location,
            severity,
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn warning(location: SourceLocation, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(location, DiagnosticSeverity::Warning, kind, message)
    }
}

/// Collection of diagnostic marks for one conversion
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Diagnostics {
    pub marks: Vec<DiagnosticMark>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { marks: Vec::new() }
    }

    /// Log a mark at the level matching its severity, then keep it
    pub fn report(&mut self, mark: DiagnosticMark) {
        match mark.severity {
            DiagnosticSeverity::Error => log::error!("{} ({}): {}", mark.kind, mark.location, mark.message),
            DiagnosticSeverity::Warning => log::warn!("{} ({}): {}", mark.kind, mark.location, mark.message),
            DiagnosticSeverity::Info => log::info!("{} ({}): {}", mark.kind, mark.location, mark.message),
        }
        self.marks.push(mark);
    }

    /// Marks of the given kind
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a DiagnosticMark> + 'a {
        self.marks.iter().filter(move |m| m.kind == kind)
    }

    pub fn has_errors(&self) -> bool {
        self.marks
            .iter()
            .any(|m| m.severity == DiagnosticSeverity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }
}
