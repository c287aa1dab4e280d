//! Energy-flux onset detection tuned for isolated percussive hits.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AudioError;

const EPSILON: f32 = 1e-10;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OnsetConfig {
    /// Analysis window in samples.
    pub frame_size: usize,
    /// Samples between consecutive windows.
    pub hop_size: usize,
    /// Peak threshold relative to the strongest flux peak.
    pub threshold_db: f32,
    /// Peaks closer than this collapse into the stronger one.
    pub min_gap_seconds: f64,
    /// Silence prepended before analysis so a hit at t = 0 still shows a rise.
    pub lead_in_seconds: f64,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            threshold_db: -20.0,
            min_gap_seconds: 0.05,
            lead_in_seconds: 1.0,
        }
    }
}

pub trait OnsetDetector {
    /// Onset times in seconds from the start of `samples`, ascending and non-negative.
    fn detect(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f64>, AudioError>;
}

/// Half-wave rectified frame energy difference.
///
/// `flux[0]` is the first frame's energy (a rise from silence).
pub fn energy_flux(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Array1<f32>, AudioError> {
    if frame_size == 0 || hop_size == 0 {
        return Err(AudioError::invalid_input(format!(
            "frame size ({frame_size}) and hop size ({hop_size}) must be > 0"
        )));
    }
    if samples.len() < frame_size {
        return Ok(Array1::zeros(0));
    }

    let frames = (samples.len() - frame_size) / hop_size + 1;
    let energies = Array1::from_shape_fn(frames, |frame| {
        let start = frame * hop_size;
        let window = &samples[start..start + frame_size];
        (window.iter().map(|s| s * s).sum::<f32>() / frame_size as f32).sqrt()
    });
    Ok(Array1::from_shape_fn(frames, |frame| {
        if frame == 0 {
            energies[0]
        } else {
            (energies[frame] - energies[frame - 1]).max(0.0)
        }
    }))
}

/// Indices of local flux maxima at or above `threshold`, at least
/// `min_gap` frames apart. Within a gap the stronger peak wins.
fn pick_peaks(flux: &Array1<f32>, threshold: f32, min_gap: usize) -> Vec<usize> {
    let len = flux.len();
    let mut peaks: Vec<usize> = Vec::new();
    for index in 0..len {
        let value = flux[index];
        if value < threshold {
            continue;
        }
        let left = if index > 0 { flux[index - 1] } else { 0.0 };
        let right = if index + 1 < len { flux[index + 1] } else { 0.0 };
        if value < left || value <= right {
            continue;
        }
        match peaks.last_mut() {
            Some(last) if index - *last < min_gap => {
                if value > flux[*last] {
                    *last = index;
                }
            }
            _ => peaks.push(index),
        }
    }
    peaks
}

pub struct EnergyFluxOnsetDetector {
    config: OnsetConfig,
}

impl EnergyFluxOnsetDetector {
    pub fn new(config: OnsetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OnsetConfig {
        &self.config
    }
}

impl Default for EnergyFluxOnsetDetector {
    fn default() -> Self {
        Self::new(OnsetConfig::default())
    }
}

impl OnsetDetector for EnergyFluxOnsetDetector {
    fn detect(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f64>, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::invalid_input("sample rate must be > 0"));
        }
        let OnsetConfig {
            frame_size,
            hop_size,
            threshold_db,
            min_gap_seconds,
            lead_in_seconds,
        } = self.config;
        let rate = sample_rate as f64;

        let lead_in = (lead_in_seconds.max(0.0) * rate).round() as usize;
        let mut padded = vec![0.0f32; lead_in];
        padded.extend_from_slice(samples);

        let flux = energy_flux(&padded, frame_size, hop_size)?;
        let max_flux = flux.iter().copied().fold(0.0f32, f32::max);
        if max_flux <= EPSILON {
            debug!(frames = flux.len(), "no energy rise found");
            return Ok(Vec::new());
        }

        let threshold = max_flux * 10f32.powf(threshold_db / 20.0);
        let min_gap = ((min_gap_seconds * rate) / hop_size as f64).ceil().max(1.0) as usize;
        let peaks = pick_peaks(&flux, threshold, min_gap);

        // The rise lands in the newest hop of the window; report its centre.
        let offset = frame_size as f64 - hop_size as f64 / 2.0;
        let lead_in_time = lead_in as f64 / rate;
        let onsets: Vec<f64> = peaks
            .into_iter()
            .map(|frame| ((frame * hop_size) as f64 + offset) / rate - lead_in_time)
            .map(|time| time.max(0.0))
            .collect();

        debug!(
            count = onsets.len(),
            threshold,
            frames = flux.len(),
            "detected onsets"
        );
        Ok(onsets)
    }
}
