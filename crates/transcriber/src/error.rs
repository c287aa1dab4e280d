use snare_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("reference note {0} must be a power of two")]
    InvalidReferenceNote(u32),
    #[error("tempo must be a positive bpm, got {0}")]
    InvalidTempo(f64),
    #[error("grid duration must be positive, got {0}s")]
    InvalidDuration(f64),
    #[error("beats per measure must be positive")]
    EmptyMeasure,
    #[error("need at least 2 onsets to transcribe, got {0}")]
    InsufficientOnsets(usize),
    #[error("onset {index} has invalid time {value}")]
    InvalidOnset { index: usize, value: f64 },
    #[error("onset {index} at {current}s does not come after {previous}s")]
    UnorderedOnsets {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("metronome grid has {len} points, need at least 2")]
    GridTooShort { len: usize },
    #[error("metronome grid is not increasing (step {0})")]
    InvalidGridStep(f64),
    #[error("measure window needs {needed} grid points but the grid has {available}")]
    GridExhausted { needed: usize, available: usize },
    #[error("input spans {seconds}s, longer than the {limit}s limit")]
    DurationLimit { seconds: f64, limit: f64 },
    #[error(transparent)]
    Domain(#[from] DomainError),
}
