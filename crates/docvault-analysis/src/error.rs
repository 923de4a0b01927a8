use thiserror::Error;

/// Failures reported by extraction and interpretation collaborators.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The source is not a document type the extractor can read.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// The service call failed (network, permission, throttling).
    #[error("Analysis service error: {0}")]
    Service(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Analysis task failed: {0}")]
    Task(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    pub fn is_unsupported_input(&self) -> bool {
        matches!(self, AnalysisError::UnsupportedInput(_))
    }
}
