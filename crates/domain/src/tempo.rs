use serde::{Deserialize, Serialize};

use crate::{DomainError, TimeSignature};

/// Constant tempo of a piece, counted in quarter notes per minute.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    pub fn new(bpm: f64) -> Result<Self, DomainError> {
        if !bpm.is_finite() || !(10.0..=400.0).contains(&bpm) {
            return Err(DomainError::validation(format!(
                "tempo bpm must be between 10 and 400, got {bpm}"
            )));
        }
        Ok(Self { bpm })
    }

    /// Detected tempos are snapped to whole BPM before use.
    pub fn rounded(bpm: f64) -> Result<Self, DomainError> {
        Self::new(bpm.round())
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Seconds covered by one `reference_note` (4 = quarter, 8 = eighth, ...).
    pub fn seconds_per_reference(&self, reference_note: u32) -> f64 {
        self.seconds_per_beat() / (reference_note as f64 / 4.0)
    }

    pub fn measure_seconds(&self, signature: &TimeSignature) -> f64 {
        signature.measure_capacity() * self.seconds_per_beat()
    }
}

impl TryFrom<f64> for Tempo {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tempo> for f64 {
    fn from(value: Tempo) -> Self {
        value.bpm
    }
}
