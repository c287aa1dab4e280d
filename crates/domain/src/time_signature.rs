use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Meter of a piece as `(notes_per_measure, reference_note)`, e.g. 6/8.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSignature {
    notes_per_measure: u32,
    reference_note: u32,
}

impl TimeSignature {
    pub fn new(notes_per_measure: u32, reference_note: u32) -> Result<Self, DomainError> {
        if notes_per_measure == 0 {
            return Err(DomainError::InvalidTimeSignature(format!(
                "{notes_per_measure}/{reference_note}"
            )));
        }
        if !reference_note.is_power_of_two() {
            return Err(DomainError::InvalidReferenceNote(reference_note));
        }
        Ok(Self {
            notes_per_measure,
            reference_note,
        })
    }

    pub fn notes_per_measure(&self) -> u32 {
        self.notes_per_measure
    }

    pub fn reference_note(&self) -> u32 {
        self.reference_note
    }

    /// Length of one measure in quarter-note units (4/4 -> 4.0, 6/8 -> 3.0).
    pub fn measure_capacity(&self) -> f64 {
        self.notes_per_measure as f64 * (4.0 / self.reference_note as f64)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            notes_per_measure: 4,
            reference_note: 4,
        }
    }
}

impl FromStr for TimeSignature {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidTimeSignature(s.to_string());
        let (numerator, denominator) = s.split_once('/').ok_or_else(invalid)?;
        let notes_per_measure = numerator.trim().parse::<u32>().map_err(|_| invalid())?;
        let reference_note = denominator.trim().parse::<u32>().map_err(|_| invalid())?;
        Self::new(notes_per_measure, reference_note)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.notes_per_measure, self.reference_note)
    }
}

impl TryFrom<String> for TimeSignature {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSignature> for String {
    fn from(value: TimeSignature) -> Self {
        value.to_string()
    }
}
