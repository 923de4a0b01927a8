use crate::error::{AnalysisError, AnalysisResult};
use crate::identity::{EnvIdentityProvider, StaticIdentityProvider};
use crate::traits::{IdentityProvider, TextExtractor, TextInterpreter};
use docvault_core::{AnalysisBackend, Config};
use std::sync::Arc;

/// Create the text extractor selected by `EXTRACTOR_BACKEND`
pub async fn create_extractor(config: &Config) -> AnalysisResult<Arc<dyn TextExtractor>> {
    match config.extractor_backend {
        #[cfg(feature = "extractor-pdf")]
        AnalysisBackend::Pdf => Ok(Arc::new(crate::PdfTextExtractor::new())),

        #[cfg(not(feature = "extractor-pdf"))]
        AnalysisBackend::Pdf => Err(AnalysisError::Config(
            "PDF extractor not available (extractor-pdf feature not enabled)".to_string(),
        )),

        #[cfg(feature = "extractor-aws-textract")]
        AnalysisBackend::Textract => {
            let region = config.analysis_region().map(String::from);
            Ok(Arc::new(crate::TextractExtractor::new(region).await))
        }

        #[cfg(not(feature = "extractor-aws-textract"))]
        AnalysisBackend::Textract => Err(AnalysisError::Config(
            "Textract extractor not available (extractor-aws-textract feature not enabled)"
                .to_string(),
        )),
    }
}

/// Create the text interpreter
#[cfg(feature = "interpreter-aws-comprehend")]
pub async fn create_interpreter(config: &Config) -> AnalysisResult<Arc<dyn TextInterpreter>> {
    let region = config.analysis_region().map(String::from);
    let interpreter =
        crate::ComprehendInterpreter::new(region, config.interpreter_language.clone()).await;
    Ok(Arc::new(interpreter))
}

#[cfg(not(feature = "interpreter-aws-comprehend"))]
pub async fn create_interpreter(_config: &Config) -> AnalysisResult<Arc<dyn TextInterpreter>> {
    Err(AnalysisError::Config(
        "Comprehend interpreter not available (interpreter-aws-comprehend feature not enabled)"
            .to_string(),
    ))
}

/// Identity comes from configuration when set, otherwise from the environment per call.
pub fn create_identity_provider(config: &Config) -> Arc<dyn IdentityProvider> {
    match &config.user_email {
        Some(email) => Arc::new(StaticIdentityProvider::new(Some(email.clone()))),
        None => Arc::new(EnvIdentityProvider),
    }
}
