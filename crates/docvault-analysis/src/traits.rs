//! Collaborator contracts consumed by the upload pipeline

use async_trait::async_trait;
use docvault_core::{ExtractionResult, InterpretationResult, SourceFile};

use crate::error::AnalysisResult;

/// Extracts structured text from a document-like file.
///
/// Failure is routine for non-document inputs and is reported as
/// [`AnalysisError::UnsupportedInput`](crate::AnalysisError::UnsupportedInput).
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn extract(&self, file: &SourceFile) -> AnalysisResult<ExtractionResult>;
}

/// Runs sentiment and entity analysis over text.
#[async_trait]
pub trait TextInterpreter: Send + Sync {
    fn name(&self) -> &str;

    async fn interpret(&self, text: &str) -> AnalysisResult<InterpretationResult>;
}

/// Source of the signed-in user's display name. Absence is not an error.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user_display_name(&self) -> Option<String>;
}
