/// Short decaying bursts at `times`, padded with silence to `total_seconds`.
pub(crate) fn click_track(times: &[f64], total_seconds: f64, sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate as f64;
    let mut samples = vec![0.0f32; (total_seconds * rate) as usize];
    let click_len = (0.01 * rate) as usize;
    for &time in times {
        let start = (time * rate).round() as usize;
        for i in 0..click_len {
            if let Some(sample) = samples.get_mut(start + i) {
                let decay = 1.0 - i as f64 / click_len as f64;
                let phase = 2.0 * std::f64::consts::PI * 1_000.0 * i as f64 / rate;
                *sample = (decay * phase.sin().abs().max(0.2)) as f32;
            }
        }
    }
    samples
}
