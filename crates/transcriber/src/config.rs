use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use snare_audio::{OnsetConfig, TempoConfig};
use snare_domain::SNARE_MIDI_NOTE;

/// Tunables for the audio-to-score pipeline. Every key is optional in YAML.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub onset: OnsetConfig,
    pub tempo: TempoConfig,
    /// Percussion key written to the score.
    pub midi_note: u8,
    /// Extra measures of metronome grid past the end of the audio.
    pub grid_padding_measures: u32,
    /// Longest recording or onset span accepted, in seconds.
    pub max_duration_seconds: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            onset: OnsetConfig::default(),
            tempo: TempoConfig::default(),
            midi_note: SNARE_MIDI_NOTE,
            grid_padding_measures: 2,
            max_duration_seconds: 3_600.0,
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).context("parse pipeline config")
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source =
            fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        Self::from_yaml_str(&source).with_context(|| format!("load config {:?}", path))
    }
}
