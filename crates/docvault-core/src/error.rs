//! Error types module
//!
//! `AppError` covers failures raised by the domain layer itself (parsing user
//! input, loading source files). Collaborator crates keep their own error enums
//! (`StorageError`, `AnalysisError`, `PipelineError`).

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
