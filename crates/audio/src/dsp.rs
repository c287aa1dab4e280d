#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakLevel {
    pub max: f32,
    pub min: f32,
}

impl PeakLevel {
    pub fn silence() -> Self {
        Self { max: 0.0, min: 0.0 }
    }

    pub fn magnitude(&self) -> f32 {
        self.max.abs().max(self.min.abs())
    }
}

/// Scales `buffer` so its loudest sample sits at unity and returns the
/// peak measured before scaling.
pub fn normalize_buffer(buffer: &mut [f32]) -> PeakLevel {
    let mut peak = PeakLevel::silence();
    for sample in buffer.iter() {
        peak.max = peak.max.max(*sample);
        peak.min = peak.min.min(*sample);
    }
    let gain = peak.magnitude().max(1e-6);
    for sample in buffer.iter_mut() {
        *sample /= gain;
    }
    peak
}

/// Averages interleaved frames down to one channel.
pub fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear-interpolation resampler. Good enough for onset timing, not for listening.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((samples.len() as f64) / ratio).floor() as usize;
    let last = samples.len() - 1;
    (0..out_len)
        .map(|index| {
            let position = index as f64 * ratio;
            let left = (position.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let frac = (position - left as f64) as f32;
            samples[left] + (samples[right] - samples[left]) * frac
        })
        .collect()
}
