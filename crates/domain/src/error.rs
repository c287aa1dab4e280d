use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid time signature {0:?}, expected \"N/M\"")]
    InvalidTimeSignature(String),
    #[error("reference note {0} must be a power of two")]
    InvalidReferenceNote(u32),
}

impl DomainError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }
}
