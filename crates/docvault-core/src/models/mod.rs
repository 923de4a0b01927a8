//! Domain models shared across the workspace

pub mod extraction;
pub mod file;
pub mod interpretation;
pub mod object;
pub mod tier;

pub use extraction::{ExtractionResult, KeyValue, SelectionMark, SelectionStatus, Table};
pub use file::SourceFile;
pub use interpretation::{EntityType, InterpretationResult, Sentiment, TextEntity};
pub use object::StoredObject;
pub use tier::StorageTier;
