use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use snare_audio::{normalize_buffer, AudioDecoder, EnergyFluxOnsetDetector, OnsetDetector};
use snare_domain::{Score, Tempo, TimeSignature};

use crate::config::PipelineConfig;
use crate::error::TranscriptionError;
use crate::measures::segment;
use crate::metronome::MetronomeGrid;
use crate::rhythm;
use crate::tempo::TempoEstimator;

fn default_time_signature() -> String {
    TimeSignature::default().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionJob {
    pub audio_path: String,
    pub title: String,
    /// Known tempo in bpm; estimated from the audio when absent.
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default = "default_time_signature")]
    pub time_signature: String,
    /// Resample to this rate before analysis; the file's own rate when absent.
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

impl TranscriptionJob {
    pub fn new(audio_path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            audio_path: audio_path.into(),
            title: title.into(),
            tempo: None,
            time_signature: default_time_signature(),
            sample_rate: None,
        }
    }
}

pub struct TranscriptionPipeline {
    config: PipelineConfig,
    tempo: TempoEstimator,
    onsets: EnergyFluxOnsetDetector,
}

impl TranscriptionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            tempo: TempoEstimator::new(config.tempo),
            onsets: EnergyFluxOnsetDetector::new(config.onset),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[instrument(skip(self), fields(path = %job.audio_path))]
    pub fn transcribe(&self, job: &TranscriptionJob) -> Result<Score> {
        info!("loading audio");
        let mut audio = AudioDecoder::open(&job.audio_path)?;
        if let Some(rate) = job.sample_rate {
            audio = audio.resampled(rate);
        }
        let peak = normalize_buffer(&mut audio.samples);
        debug!(
            peak = peak.magnitude(),
            seconds = audio.duration_seconds(),
            "normalized audio"
        );
        self.transcribe_samples(&audio.samples, audio.sample_rate, job)
    }

    /// Transcribe already decoded mono samples.
    #[instrument(skip(self, samples, job), fields(title = %job.title))]
    pub fn transcribe_samples(
        &self,
        samples: &[f32],
        sample_rate: u32,
        job: &TranscriptionJob,
    ) -> Result<Score> {
        let signature: TimeSignature = job
            .time_signature
            .parse()
            .with_context(|| format!("time signature {:?}", job.time_signature))?;
        let onsets = self
            .onsets
            .detect(samples, sample_rate)
            .context("detect onsets")?;
        info!(count = onsets.len(), "detected onsets");
        let tempo = match job.tempo {
            Some(bpm) => Tempo::new(bpm)?,
            None => self.tempo.estimate(samples, sample_rate)?,
        };
        let audio_seconds = samples.len() as f64 / sample_rate as f64;
        self.score_from_onsets(&onsets, tempo, signature, &job.title, audio_seconds)
    }

    /// Transcribe onset times detected elsewhere.
    #[instrument(skip(self, onsets), fields(count = onsets.len()))]
    pub fn transcribe_onsets(
        &self,
        onsets: &[f64],
        tempo: Tempo,
        time_signature: TimeSignature,
        title: &str,
    ) -> Result<Score> {
        self.score_from_onsets(onsets, tempo, time_signature, title, 0.0)
    }

    fn score_from_onsets(
        &self,
        onsets: &[f64],
        tempo: Tempo,
        signature: TimeSignature,
        title: &str,
        audio_seconds: f64,
    ) -> Result<Score> {
        rhythm::validate_onsets(onsets)?;
        if onsets.len() < 2 {
            return Err(TranscriptionError::InsufficientOnsets(onsets.len()).into());
        }
        let last_onset = onsets.last().copied().unwrap_or(0.0);
        let span = audio_seconds.max(last_onset);
        let limit = self.config.max_duration_seconds;
        if span > limit {
            return Err(TranscriptionError::DurationLimit {
                seconds: span,
                limit,
            }
            .into());
        }

        let padding = self.config.grid_padding_measures as f64 * tempo.measure_seconds(&signature);
        let grid = MetronomeGrid::new(tempo.bpm(), span + padding, signature.reference_note())?;
        let points = grid.points();
        debug!(points = points.len(), step = grid.step(), "built metronome grid");

        // Measure grouping is only reported; the score does not depend on it.
        match segment(onsets, &points, signature.notes_per_measure()) {
            Ok(measures) => {
                for (index, hits) in measures.iter().enumerate() {
                    debug!(measure = index + 1, hits = hits.len(), "segmented measure");
                }
            }
            Err(err) => warn!(error = %err, "measure segmentation skipped"),
        }

        let events =
            rhythm::transcribe(onsets, &points, signature).context("transcribe rhythm")?;
        info!(
            bpm = tempo.bpm(),
            %signature,
            events = events.len(),
            "transcription finished"
        );
        Ok(Score::new(title, tempo, signature, events).with_midi_note(self.config.midi_note))
    }
}

impl Default for TranscriptionPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
