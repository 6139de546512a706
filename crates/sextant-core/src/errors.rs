/// Typed error hierarchy for extraction and scoring operations.
/// The core has no retry logic: every variant is a single-shot failure.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ScoreError {
    /// Raw input exceeded the size ceiling. Checked before any extraction work.
    #[error("input too large: {actual} bytes exceeds the {limit} byte limit")]
    InputTooLarge { limit: usize, actual: usize },

    /// Extracted or constructed data violates a data-model invariant.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ScoreError {
    /// Short classification string for logging and wire error codes.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::InputTooLarge { .. } => "input_too_large",
            Self::Validation(_) => "validation",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<std::io::Error> for ScoreError {
    fn from(e: std::io::Error) -> Self {
        ScoreError::Io(e.to_string())
    }
}
