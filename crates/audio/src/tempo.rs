//! Global tempo estimation from the periodicity of the onset envelope.
//!
//! 1. Energy flux envelope (same as onset detection)
//! 2. Autocorrelation via FFT: `ACF = IFFT(|FFT(envelope)|^2)`
//! 3. Lags inside `[min_bpm, max_bpm]` are weighted by a log-normal tempo prior
//! 4. Parabolic interpolation around the winning lag, `bpm = 60 * frame_rate / lag`

use ndarray::ArrayView1;
use realfft::num_complex::Complex;
use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AudioError;
use crate::onset::energy_flux;

const EPSILON: f32 = 1e-10;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TempoConfig {
    pub min_bpm: f64,
    pub max_bpm: f64,
    /// Centre of the tempo prior; octave errors are resolved towards it.
    pub prior_bpm: f64,
    /// Width of the prior in octaves.
    pub prior_octaves: f64,
    pub frame_size: usize,
    pub hop_size: usize,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            min_bpm: 60.0,
            max_bpm: 200.0,
            prior_bpm: 120.0,
            prior_octaves: 1.0,
            frame_size: 2048,
            hop_size: 512,
        }
    }
}

pub trait TempoDetector {
    /// Tempo in quarter notes per minute, unrounded.
    fn estimate_bpm(&self, samples: &[f32], sample_rate: u32) -> Result<f64, AudioError>;
}

pub struct AutocorrelationTempoDetector {
    config: TempoConfig,
}

impl AutocorrelationTempoDetector {
    pub fn new(config: TempoConfig) -> Self {
        Self { config }
    }

    fn prior(&self, bpm: f64) -> f64 {
        let octaves = (bpm / self.config.prior_bpm).log2() / self.config.prior_octaves;
        (-0.5 * octaves * octaves).exp()
    }
}

impl Default for AutocorrelationTempoDetector {
    fn default() -> Self {
        Self::new(TempoConfig::default())
    }
}

impl TempoDetector for AutocorrelationTempoDetector {
    fn estimate_bpm(&self, samples: &[f32], sample_rate: u32) -> Result<f64, AudioError> {
        let TempoConfig {
            min_bpm,
            max_bpm,
            prior_bpm,
            prior_octaves,
            frame_size,
            hop_size,
        } = self.config;
        if sample_rate == 0 {
            return Err(AudioError::invalid_input("sample rate must be > 0"));
        }
        if min_bpm <= 0.0 || max_bpm <= min_bpm {
            return Err(AudioError::invalid_input(format!(
                "invalid bpm range [{min_bpm}, {max_bpm}]"
            )));
        }
        if prior_bpm <= 0.0 || prior_octaves <= 0.0 {
            return Err(AudioError::invalid_input("tempo prior must be positive"));
        }

        let no_tempo = AudioError::NoTempo { min_bpm, max_bpm };
        let envelope = energy_flux(samples, frame_size, hop_size)?;
        if envelope.len() < 2 {
            return Err(no_tempo);
        }
        let acf = autocorrelation(envelope.view())?;

        let frame_rate = sample_rate as f64 / hop_size as f64;
        let lag_min = ((60.0 * frame_rate / max_bpm).ceil() as usize).max(1);
        let lag_max = ((60.0 * frame_rate / min_bpm).floor() as usize).min(acf.len() - 1);
        if lag_min >= lag_max {
            return Err(no_tempo);
        }

        let mut best: Option<(usize, f64)> = None;
        for lag in lag_min..=lag_max {
            let score = acf[lag] as f64 * self.prior(60.0 * frame_rate / lag as f64);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((lag, score));
            }
        }
        let (lag, _) = best.ok_or(no_tempo)?;
        if acf[lag] <= EPSILON {
            return Err(AudioError::NoTempo { min_bpm, max_bpm });
        }

        let refined = refine_lag(&acf, lag);
        let bpm = 60.0 * frame_rate / refined;
        debug!(lag, refined, bpm, "estimated tempo");
        Ok(bpm.clamp(min_bpm, max_bpm))
    }
}

/// Vertex of the parabola through `acf[lag - 1..=lag + 1]`.
fn refine_lag(acf: &[f32], lag: usize) -> f64 {
    if lag == 0 || lag + 1 >= acf.len() {
        return lag as f64;
    }
    let (left, centre, right) = (acf[lag - 1] as f64, acf[lag] as f64, acf[lag + 1] as f64);
    let curvature = left - 2.0 * centre + right;
    if curvature.abs() < f64::EPSILON {
        return lag as f64;
    }
    let shift = 0.5 * (left - right) / curvature;
    lag as f64 + shift.clamp(-0.5, 0.5)
}

fn autocorrelation(signal: ArrayView1<f32>) -> Result<Vec<f32>, AudioError> {
    let len = signal.len();
    let fft_size = (2 * len).next_power_of_two();

    let mut planner = RealFftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(fft_size);
    let inverse = planner.plan_fft_inverse(fft_size);

    let mut input = forward.make_input_vec();
    for (slot, value) in input.iter_mut().zip(signal.iter()) {
        *slot = *value;
    }
    let mut spectrum = forward.make_output_vec();
    forward
        .process(&mut input, &mut spectrum)
        .map_err(|err| AudioError::Fft(err.to_string()))?;

    for bin in spectrum.iter_mut() {
        *bin = Complex::new(bin.norm_sqr(), 0.0);
    }

    let mut output = inverse.make_output_vec();
    inverse
        .process(&mut spectrum, &mut output)
        .map_err(|err| AudioError::Fft(err.to_string()))?;

    let scale = 1.0 / fft_size as f32;
    Ok(output[..len].iter().map(|value| value * scale).collect())
}
