use serde::{Deserialize, Serialize};
use time::Duration;

use crate::Tempo;

/// General MIDI key of the acoustic snare.
pub const SNARE_MIDI_NOTE: u8 = 38;

/// Relative tolerance used when comparing time-figures.
pub const FIGURE_RTOL: f64 = 1e-4;
const FIGURE_ATOL: f64 = 1e-8;

/// `|a - b| <= atol + rtol * |b|`, asymmetric in `b` like the usual `isclose`.
pub fn figure_is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= FIGURE_ATOL + FIGURE_RTOL * b.abs()
}

/// A note or rest; `figure` is its length in quarter notes (1.0 = quarter,
/// 0.5 = eighth, 1.5 = dotted quarter, 1/3 = quarter-note triplet).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscribedEvent {
    Hit { figure: f64 },
    Rest { figure: f64 },
}

impl TranscribedEvent {
    pub fn hit(figure: f64) -> Self {
        Self::Hit { figure }
    }

    pub fn rest(figure: f64) -> Self {
        Self::Rest { figure }
    }

    pub fn figure(&self) -> f64 {
        match *self {
            Self::Hit { figure } | Self::Rest { figure } => figure,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Self::Rest { .. })
    }

    /// Same kind of event with a different length.
    pub fn with_figure(&self, figure: f64) -> Self {
        match self {
            Self::Hit { .. } => Self::Hit { figure },
            Self::Rest { .. } => Self::Rest { figure },
        }
    }

    pub fn duration_at(&self, tempo: Tempo) -> Duration {
        Duration::seconds_f64(self.figure() * tempo.seconds_per_beat())
    }

    pub fn note_value(&self) -> Option<NoteValue> {
        NoteValue::classify(self.figure())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BaseValue {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}

impl BaseValue {
    const ALL: [BaseValue; 7] = [
        BaseValue::Whole,
        BaseValue::Half,
        BaseValue::Quarter,
        BaseValue::Eighth,
        BaseValue::Sixteenth,
        BaseValue::ThirtySecond,
        BaseValue::SixtyFourth,
    ];

    pub fn figure(&self) -> f64 {
        match self {
            BaseValue::Whole => 4.0,
            BaseValue::Half => 2.0,
            BaseValue::Quarter => 1.0,
            BaseValue::Eighth => 0.5,
            BaseValue::Sixteenth => 0.25,
            BaseValue::ThirtySecond => 0.125,
            BaseValue::SixtyFourth => 0.0625,
        }
    }

    /// MusicXML `<type>` name.
    pub fn name(&self) -> &'static str {
        match self {
            BaseValue::Whole => "whole",
            BaseValue::Half => "half",
            BaseValue::Quarter => "quarter",
            BaseValue::Eighth => "eighth",
            BaseValue::Sixteenth => "16th",
            BaseValue::ThirtySecond => "32nd",
            BaseValue::SixtyFourth => "64th",
        }
    }
}

/// Written shape of a figure: a base value, optionally dotted or played as a triplet.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteValue {
    pub base: BaseValue,
    pub dotted: bool,
    pub triplet: bool,
}

impl NoteValue {
    pub fn classify(figure: f64) -> Option<Self> {
        BaseValue::ALL.iter().find_map(|&base| {
            let plain = base.figure();
            if figure_is_close(figure, plain) {
                Some(Self {
                    base,
                    dotted: false,
                    triplet: false,
                })
            } else if figure_is_close(figure, plain * 1.5) {
                Some(Self {
                    base,
                    dotted: true,
                    triplet: false,
                })
            } else if figure_is_close(figure, plain * 2.0 / 3.0) {
                Some(Self {
                    base,
                    dotted: false,
                    triplet: true,
                })
            } else {
                None
            }
        })
    }
}
