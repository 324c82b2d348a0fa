// MusicXML document builder

use crate::score::{Barline, BarlineType, Duration, Instrument, Pitch, TieType, TimeSignature};

/// Divisions per quarter note written to every part
pub const DIVISIONS: u32 = 960;

/// Entry of the `<part-list>`
struct PartEntry {
    id: String,
    name: String,
    instrument: Instrument,
}

/// What a written note looks like, beyond its pitch
#[derive(Debug, Clone, Copy)]
pub struct NoteLayout<'a> {
    pub duration: &'a Duration,
    pub voice: usize,
    pub chord: bool,
    pub tie: Option<TieType>,
}

/// Builds a partwise MusicXML 3.1 document part by part
pub struct MusicXmlBuilder {
    buffer: String,
    parts: Vec<PartEntry>,
    title: Option<String>,
    composer: Option<String>,
    unpitched: bool,
}

impl MusicXmlBuilder {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            parts: Vec::new(),
            title: None,
            composer: None,
            unpitched: false,
        }
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title.filter(|t| !t.is_empty());
    }

    pub fn set_composer(&mut self, composer: Option<String>) {
        self.composer = composer.filter(|c| !c.is_empty());
    }

    /// Open a `<part>` and register it in the part list
    pub fn start_part(&mut self, id: &str, name: &str, instrument: &Instrument) {
        self.parts.push(PartEntry {
            id: id.to_string(),
            name: name.to_string(),
            instrument: instrument.clone(),
        });
        self.unpitched = instrument.unpitched;
        self.buffer.push_str(&format!("  <part id=\"{}\">\n", xml_escape(id)));
    }

    pub fn end_part(&mut self) {
        self.buffer.push_str("  </part>\n");
    }

    pub fn start_measure(&mut self, number: usize, left_barline: Option<&Barline>) {
        self.buffer.push_str(&format!("    <measure number=\"{}\">\n", number));
        if let Some(barline) = left_barline {
            self.write_barline("left", barline);
        }
    }

    pub fn end_measure(&mut self, right_barline: Option<&Barline>) {
        if let Some(barline) = right_barline {
            self.write_barline("right", barline);
        }
        self.buffer.push_str("    </measure>\n");
    }

    /// Divisions, key and clef for the first measure; time signature where given
    pub fn write_attributes(&mut self, first_measure: bool, time_signature: Option<&TimeSignature>) {
        if !first_measure && time_signature.is_none() {
            return;
        }
        self.buffer.push_str("      <attributes>\n");
        if first_measure {
            self.buffer.push_str(&format!("        <divisions>{}</divisions>\n", DIVISIONS));
            self.buffer.push_str("        <key><fifths>0</fifths></key>\n");
        }
        if let Some(ts) = time_signature {
            self.buffer.push_str(&format!(
                "        <time><beats>{}</beats><beat-type>{}</beat-type></time>\n",
                ts.numerator,
                ts.written_denominator()
            ));
        }
        if first_measure {
            if self.unpitched {
                self.buffer.push_str("        <clef><sign>percussion</sign></clef>\n");
            } else {
                self.buffer.push_str("        <clef><sign>G</sign><line>2</line></clef>\n");
            }
        }
        self.buffer.push_str("      </attributes>\n");
    }

    /// Metronome direction plus the matching playback tempo
    pub fn write_metronome(&mut self, bpm: f64) {
        let per_minute = format_number(bpm);
        self.buffer.push_str("      <direction placement=\"above\">\n");
        self.buffer.push_str("        <direction-type>\n");
        self.buffer.push_str(&format!(
            "          <metronome><beat-unit>quarter</beat-unit><per-minute>{}</per-minute></metronome>\n",
            per_minute
        ));
        self.buffer.push_str("        </direction-type>\n");
        self.buffer.push_str(&format!("        <sound tempo=\"{}\"/>\n", per_minute));
        self.buffer.push_str("      </direction>\n");
    }

    pub fn write_note(&mut self, pitch: &Pitch, layout: NoteLayout<'_>) {
        self.buffer.push_str("      <note>\n");
        if layout.chord {
            self.buffer.push_str("        <chord/>\n");
        }

        let (step, alter, octave) = pitch.step_alter_octave();
        if self.unpitched {
            self.buffer.push_str(&format!(
                "        <unpitched><display-step>{}</display-step><display-octave>{}</display-octave></unpitched>\n",
                step, octave
            ));
        } else {
            self.buffer.push_str("        <pitch>\n");
            self.buffer.push_str(&format!("          <step>{}</step>\n", step));
            if alter != 0 {
                self.buffer.push_str(&format!("          <alter>{}</alter>\n", alter));
            }
            self.buffer.push_str(&format!("          <octave>{}</octave>\n", octave));
            self.buffer.push_str("        </pitch>\n");
        }

        self.buffer.push_str(&format!("        <duration>{}</duration>\n", divisions(layout.duration)));
        // <tie> must come before <voice> and <type>
        let ties = layout.tie.map(tie_names).unwrap_or_default();
        for name in ties {
            self.buffer.push_str(&format!("        <tie type=\"{}\"/>\n", name));
        }
        self.write_voice_and_type(layout.voice, layout.duration);

        if !ties.is_empty() {
            self.buffer.push_str("        <notations>\n");
            for name in ties {
                self.buffer.push_str(&format!("          <tied type=\"{}\"/>\n", name));
            }
            self.buffer.push_str("        </notations>\n");
        }
        self.buffer.push_str("      </note>\n");
    }

    pub fn write_rest(&mut self, duration: &Duration, voice: usize) {
        self.buffer.push_str("      <note>\n");
        self.buffer.push_str("        <rest/>\n");
        self.buffer.push_str(&format!("        <duration>{}</duration>\n", divisions(duration)));
        self.write_voice_and_type(voice, duration);
        self.buffer.push_str("      </note>\n");
    }

    /// Move the cursor back, e.g. to the start of the measure for the next voice
    pub fn write_backup(&mut self, duration_divs: u64) {
        if duration_divs > 0 {
            self.buffer.push_str(&format!(
                "      <backup><duration>{}</duration></backup>\n",
                duration_divs
            ));
        }
    }

    /// Move the cursor forward over a gap in a voice
    pub fn write_forward(&mut self, duration_divs: u64) {
        if duration_divs > 0 {
            self.buffer.push_str(&format!(
                "      <forward><duration>{}</duration></forward>\n",
                duration_divs
            ));
        }
    }

    /// Voice, type, dots and tuplet time modification, in schema order
    fn write_voice_and_type(&mut self, voice: usize, duration: &Duration) {
        self.buffer.push_str(&format!("        <voice>{}</voice>\n", voice));
        // No single written value fits a complex length; the duration alone carries it
        if let Some((kind, dots)) = duration.notation() {
            self.buffer.push_str(&format!("        <type>{}</type>\n", kind.name()));
            for _ in 0..dots {
                self.buffer.push_str("        <dot/>\n");
            }
        }
        if let Some(ratio) = duration.tuplet() {
            self.buffer.push_str("        <time-modification>\n");
            self.buffer.push_str(&format!("          <actual-notes>{}</actual-notes>\n", ratio.actual_notes));
            self.buffer.push_str(&format!("          <normal-notes>{}</normal-notes>\n", ratio.normal_notes));
            self.buffer.push_str("        </time-modification>\n");
        }
    }

    fn write_barline(&mut self, location: &str, barline: &Barline) {
        let style = match barline.barline_type {
            BarlineType::StartRepeat => "heavy-light",
            BarlineType::EndRepeat => "light-heavy",
        };
        self.buffer.push_str(&format!("      <barline location=\"{}\">\n", location));
        self.buffer.push_str(&format!("        <bar-style>{}</bar-style>\n", style));
        match barline.barline_type {
            BarlineType::StartRepeat => {
                self.buffer.push_str("        <repeat direction=\"forward\"/>\n");
            }
            BarlineType::EndRepeat => match barline.times {
                Some(times) => self.buffer.push_str(&format!(
                    "        <repeat direction=\"backward\" times=\"{}\"/>\n",
                    times
                )),
                None => self.buffer.push_str("        <repeat direction=\"backward\"/>\n"),
            },
        }
        self.buffer.push_str("      </barline>\n");
    }

    /// Finalize and return complete MusicXML string
    pub fn finalize(self) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<!DOCTYPE score-partwise PUBLIC \"-//Recordare//DTD MusicXML 3.1 Partwise//EN\" \"http://www.musicxml.org/dtds/partwise.dtd\">\n");
        xml.push_str("<score-partwise version=\"3.1\">\n");

        if let Some(title) = &self.title {
            xml.push_str(&format!("  <work><work-title>{}</work-title></work>\n", xml_escape(title)));
            xml.push_str(&format!("  <movement-title>{}</movement-title>\n", xml_escape(title)));
        }
        if let Some(composer) = &self.composer {
            xml.push_str("  <identification>\n");
            xml.push_str(&format!(
                "    <creator type=\"composer\">{}</creator>\n",
                xml_escape(composer)
            ));
            xml.push_str("  </identification>\n");
        }

        xml.push_str("  <part-list>\n");
        for part in &self.parts {
            write_score_part(&mut xml, part);
        }
        xml.push_str("  </part-list>\n");
        xml.push_str(&self.buffer);
        xml.push_str("</score-partwise>\n");
        xml
    }
}

fn write_score_part(xml: &mut String, part: &PartEntry) {
    let id = xml_escape(&part.id);
    xml.push_str(&format!("    <score-part id=\"{}\">\n", id));
    xml.push_str(&format!("      <part-name>{}</part-name>\n", xml_escape(&part.name)));
    xml.push_str(&format!("      <score-instrument id=\"{}-I1\">\n", id));
    xml.push_str(&format!(
        "        <instrument-name>{}</instrument-name>\n",
        xml_escape(&part.instrument.name)
    ));
    xml.push_str("      </score-instrument>\n");
    if part.instrument.midi_channel.is_some() || part.instrument.midi_program.is_some() {
        // MusicXML numbers channels and programs from 1
        xml.push_str(&format!("      <midi-instrument id=\"{}-I1\">\n", id));
        if let Some(channel) = part.instrument.midi_channel {
            xml.push_str(&format!("        <midi-channel>{}</midi-channel>\n", channel as u32 + 1));
        }
        if let Some(program) = part.instrument.midi_program {
            xml.push_str(&format!("        <midi-program>{}</midi-program>\n", program as u32 + 1));
        }
        xml.push_str("      </midi-instrument>\n");
    }
    xml.push_str("    </score-part>\n");
}

/// Length of a duration in divisions, rounded to the nearest division
pub fn divisions(duration: &Duration) -> u64 {
    let divs = (duration.quarter_length() * DIVISIONS as i64).round().to_integer();
    divs.max(0) as u64
}

/// Tie elements for a note; a continued note both ends and starts a tie
fn tie_names(tie: TieType) -> &'static [&'static str] {
    match tie {
        TieType::Start => &["start"],
        TieType::Continue => &["stop", "start"],
        TieType::Stop => &["stop"],
    }
}

/// Integral tempos print without a fraction
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Escape special XML characters
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

impl Default for MusicXmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}
