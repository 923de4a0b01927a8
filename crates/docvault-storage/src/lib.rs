//! Docvault Storage Library
//!
//! This crate provides the tier-scoped `ObjectStore` abstraction and its
//! implementations for S3 and the local filesystem.
//!
//! # Storage key format
//!
//! Every tier is a separate namespace. All backends use the same layout:
//!
//! - **guest**: `public/{key}`
//! - **protected**: `protected/{identity_id}/{key}`
//! - **private**: `private/{identity_id}/{key}`
//!
//! Keys must be non-empty and must not contain `..` or start with `/`. Listing
//! returns keys relative to the tier namespace. Key generation is centralized in
//! the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use docvault_core::StorageBackend;
pub use factory::create_storage;
pub use keys::KeyLayout;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(any(test, feature = "test-helpers"))]
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{
    no_progress, ObjectStore, ProgressCallback, StorageError, StorageResult, TransferProgress,
};
