use anyhow::{Context, Result};
use tracing::{debug, info};

use snare_audio::{AutocorrelationTempoDetector, TempoConfig, TempoDetector};
use snare_domain::Tempo;

/// Estimates a whole-number tempo for a recording.
pub struct TempoEstimator<D = AutocorrelationTempoDetector> {
    detector: D,
}

impl TempoEstimator {
    pub fn new(config: TempoConfig) -> Self {
        Self::with_detector(AutocorrelationTempoDetector::new(config))
    }
}

impl<D: TempoDetector> TempoEstimator<D> {
    pub fn with_detector(detector: D) -> Self {
        Self { detector }
    }

    pub fn estimate(&self, samples: &[f32], sample_rate: u32) -> Result<Tempo> {
        debug!(sample_rate, sample_count = samples.len(), "estimating tempo");
        let raw = self
            .detector
            .estimate_bpm(samples, sample_rate)
            .context("estimate tempo")?;
        let tempo = Tempo::rounded(raw).with_context(|| format!("detected tempo {raw:.2} bpm"))?;
        info!(raw_bpm = raw, bpm = tempo.bpm(), "tempo estimated");
        Ok(tempo)
    }
}
