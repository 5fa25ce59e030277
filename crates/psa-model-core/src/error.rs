use thiserror::Error;

#[derive(Debug, Error)]
pub enum PsaModelError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PsaModelError {
    fn from(e: serde_json::Error) -> Self {
        PsaModelError::SerializationError(e.to_string())
    }
}
