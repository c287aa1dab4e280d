use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::{error::DomainError, events::TranscribedEvent, score::Score};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExportFormat {
    MusicXml,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::MusicXml => "musicxml",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "musicxml" | "xml" => Ok(ExportFormat::MusicXml),
            other => Err(DomainError::validation(format!(
                "unknown export format {other:?}"
            ))),
        }
    }
}

pub trait NotationExporter {
    fn export(&self, score: &Score, format: ExportFormat) -> Result<Vec<u8>, DomainError>;
}

/// Serializes with whichever exporter handles `format`.
pub fn export_score(score: &Score, format: ExportFormat) -> Result<Vec<u8>, DomainError> {
    match format {
        ExportFormat::Json => JsonExporter.export(score, format),
        ExportFormat::MusicXml => MusicXmlExporter.export(score, format),
    }
}

pub struct JsonExporter;

impl NotationExporter for JsonExporter {
    fn export(&self, score: &Score, format: ExportFormat) -> Result<Vec<u8>, DomainError> {
        match format {
            ExportFormat::Json => serde_json::to_vec_pretty(score)
                .map_err(|err| DomainError::Serialization(err.to_string())),
            other => Err(DomainError::validation(format!(
                "JsonExporter cannot handle {:?}",
                other
            ))),
        }
    }
}

/// Ticks per quarter note; divisible by every triplet and dotted figure down to 32nds.
const DIVISIONS: u32 = 48;
const PART_ID: &str = "P1";

pub struct MusicXmlExporter;

impl NotationExporter for MusicXmlExporter {
    fn export(&self, score: &Score, format: ExportFormat) -> Result<Vec<u8>, DomainError> {
        match format {
            ExportFormat::MusicXml => {
                write_score(score).map_err(|err| DomainError::Serialization(err.to_string()))
            }
            other => Err(DomainError::validation(format!(
                "MusicXmlExporter cannot handle {:?}",
                other
            ))),
        }
    }
}

fn write_score(score: &Score) -> quick_xml::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(
        r#"score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd""#,
    )))?;

    writer
        .create_element("score-partwise")
        .with_attribute(("version", "3.1"))
        .write_inner_content(|writer| {
            writer
                .create_element("movement-title")
                .write_text_content(BytesText::new(&score.title))?;
            writer
                .create_element("part-list")
                .write_inner_content(|writer| {
                    writer
                        .create_element("score-part")
                        .with_attribute(("id", PART_ID))
                        .write_inner_content(|writer| {
                            writer
                                .create_element("part-name")
                                .write_text_content(BytesText::new("Snare Drum"))?;
                            writer
                                .create_element("midi-instrument")
                                .with_attribute(("id", "P1-I1"))
                                .write_inner_content(|writer| {
                                    writer.create_element("midi-channel").write_text_content(
                                        BytesText::new("10"),
                                    )?;
                                    writer.create_element("midi-unpitched").write_text_content(
                                        BytesText::new(&(score.midi_note as u32 + 1).to_string()),
                                    )?;
                                    Ok(())
                                })?;
                            Ok(())
                        })?;
                    Ok(())
                })?;
            writer
                .create_element("part")
                .with_attribute(("id", PART_ID))
                .write_inner_content(|writer| {
                    for (index, measure) in score.measures().iter().enumerate() {
                        write_measure(writer, score, index, measure)?;
                    }
                    Ok(())
                })?;
            Ok(())
        })?;

    Ok(writer.into_inner())
}

fn write_measure(
    writer: &mut Writer<Vec<u8>>,
    score: &Score,
    index: usize,
    events: &[TranscribedEvent],
) -> quick_xml::Result<()> {
    writer
        .create_element("measure")
        .with_attribute(("number", (index + 1).to_string().as_str()))
        .write_inner_content(|writer| {
            if index == 0 {
                write_attributes(writer, score)?;
            }
            for event in events {
                write_note(writer, event)?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_attributes(writer: &mut Writer<Vec<u8>>, score: &Score) -> quick_xml::Result<()> {
    let signature = score.time_signature;
    writer
        .create_element("attributes")
        .write_inner_content(|writer| {
            writer
                .create_element("divisions")
                .write_text_content(BytesText::new(&DIVISIONS.to_string()))?;
            writer.create_element("time").write_inner_content(|writer| {
                writer
                    .create_element("beats")
                    .write_text_content(BytesText::new(
                        &signature.notes_per_measure().to_string(),
                    ))?;
                writer
                    .create_element("beat-type")
                    .write_text_content(BytesText::new(&signature.reference_note().to_string()))?;
                Ok(())
            })?;
            writer.create_element("clef").write_inner_content(|writer| {
                writer
                    .create_element("sign")
                    .write_text_content(BytesText::new("percussion"))?;
                Ok(())
            })?;
            Ok(())
        })?;

    let bpm = format!("{}", score.tempo.bpm());
    writer
        .create_element("direction")
        .with_attribute(("placement", "above"))
        .write_inner_content(|writer| {
            writer
                .create_element("direction-type")
                .write_inner_content(|writer| {
                    writer.create_element("metronome").write_inner_content(|writer| {
                        writer
                            .create_element("beat-unit")
                            .write_text_content(BytesText::new("quarter"))?;
                        writer
                            .create_element("per-minute")
                            .write_text_content(BytesText::new(&bpm))?;
                        Ok(())
                    })?;
                    Ok(())
                })?;
            writer
                .create_element("sound")
                .with_attribute(("tempo", bpm.as_str()))
                .write_empty()?;
            Ok(())
        })?;
    Ok(())
}

fn write_note(writer: &mut Writer<Vec<u8>>, event: &TranscribedEvent) -> quick_xml::Result<()> {
    let ticks = ((event.figure() * DIVISIONS as f64).round() as u32).max(1);
    writer.create_element("note").write_inner_content(|writer| {
        if event.is_rest() {
            writer.create_element("rest").write_empty()?;
        } else {
            writer.create_element("unpitched").write_inner_content(|writer| {
                writer
                    .create_element("display-step")
                    .write_text_content(BytesText::new("C"))?;
                writer
                    .create_element("display-octave")
                    .write_text_content(BytesText::new("5"))?;
                Ok(())
            })?;
        }
        writer
            .create_element("duration")
            .write_text_content(BytesText::new(&ticks.to_string()))?;
        if !event.is_rest() {
            writer
                .create_element("instrument")
                .with_attribute(("id", "P1-I1"))
                .write_empty()?;
        }
        writer
            .create_element("voice")
            .write_text_content(BytesText::new("1"))?;
        if let Some(value) = event.note_value() {
            writer
                .create_element("type")
                .write_text_content(BytesText::new(value.base.name()))?;
            if value.dotted {
                writer.create_element("dot").write_empty()?;
            }
            if value.triplet {
                writer
                    .create_element("time-modification")
                    .write_inner_content(|writer| {
                        writer
                            .create_element("actual-notes")
                            .write_text_content(BytesText::new("3"))?;
                        writer
                            .create_element("normal-notes")
                            .write_text_content(BytesText::new("2"))?;
                        Ok(())
                    })?;
            }
        }
        Ok(())
    })?;
    Ok(())
}
