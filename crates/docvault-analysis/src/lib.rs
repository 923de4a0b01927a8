//! Docvault Analysis Library
//!
//! Collaborator contracts for document intelligence and their implementations:
//!
//! - [`TextExtractor`]: structured text from a document-like file
//!   (local PDF parsing, AWS Textract)
//! - [`TextInterpreter`]: sentiment and entities over extracted text
//!   (AWS Comprehend)
//! - [`IdentityProvider`]: display name of the current user

pub mod error;
pub mod factory;
pub mod identity;
pub mod traits;

#[cfg(feature = "interpreter-aws-comprehend")]
pub mod comprehend;
#[cfg(feature = "extractor-pdf")]
pub mod pdf;
#[cfg(feature = "extractor-aws-textract")]
pub mod textract;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::{AnalysisError, AnalysisResult};
pub use factory::{create_extractor, create_identity_provider, create_interpreter};
pub use identity::{EnvIdentityProvider, StaticIdentityProvider};
pub use traits::{IdentityProvider, TextExtractor, TextInterpreter};

#[cfg(feature = "interpreter-aws-comprehend")]
pub use comprehend::ComprehendInterpreter;
#[cfg(feature = "extractor-pdf")]
pub use pdf::PdfTextExtractor;
#[cfg(feature = "extractor-aws-textract")]
pub use textract::TextractExtractor;
