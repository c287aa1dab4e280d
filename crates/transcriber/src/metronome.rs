use crate::error::TranscriptionError;

/// Evenly spaced reference-note positions over `[0, duration)` seconds.
///
/// Points are computed as `k * step` rather than accumulated, so long grids
/// do not drift.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetronomeGrid {
    step: f64,
    duration: f64,
}

impl MetronomeGrid {
    pub fn new(tempo: f64, duration: f64, reference_note: u32) -> Result<Self, TranscriptionError> {
        if !reference_note.is_power_of_two() {
            return Err(TranscriptionError::InvalidReferenceNote(reference_note));
        }
        if !tempo.is_finite() || tempo <= 0.0 {
            return Err(TranscriptionError::InvalidTempo(tempo));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TranscriptionError::InvalidDuration(duration));
        }
        Ok(Self {
            step: (60.0 / tempo) / (reference_note as f64 / 4.0),
            duration,
        })
    }

    /// Seconds between consecutive points, i.e. the length of one reference note.
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> {
        let Self { step, duration } = *self;
        (0u64..)
            .map(move |k| k as f64 * step)
            .take_while(move |time| *time < duration)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

/// Beat timestamps for `tempo` BPM subdivided by `reference_note`.
pub fn generate_grid(
    tempo: f64,
    duration: f64,
    reference_note: u32,
) -> Result<Vec<f64>, TranscriptionError> {
    Ok(MetronomeGrid::new(tempo, duration, reference_note)?.points())
}
