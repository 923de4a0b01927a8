//! Docvault Core Library
//!
//! This crate provides the domain models, error types, and configuration shared
//! by the storage, analysis, and pipeline crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AnalysisBackend, Config};
pub use error::AppError;
pub use models::{
    EntityType, ExtractionResult, InterpretationResult, KeyValue, SelectionMark,
    SelectionStatus, Sentiment, SourceFile, StorageTier, StoredObject, Table, TextEntity,
};
pub use storage_types::StorageBackend;
