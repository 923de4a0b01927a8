use thiserror::Error;

/// Reasons a submission is refused before any job starts.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot upload empty file: {0}")]
    EmptyFile(String),

    #[error("File {filename} is {size} bytes, exceeding the {limit} byte limit")]
    FileTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },

    #[error("Pipeline task failed: {0}")]
    Task(String),
}
