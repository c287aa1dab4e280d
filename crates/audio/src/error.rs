use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("fft failed: {0}")]
    Fft(String),
    #[error("no periodicity found between {min_bpm} and {max_bpm} bpm")]
    NoTempo { min_bpm: f64, max_bpm: f64 },
}

impl AudioError {
    pub fn invalid_input<T: Into<String>>(message: T) -> Self {
        Self::InvalidInput(message.into())
    }
}
