//! Storage abstraction trait
//!
//! This module defines the `ObjectStore` trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use docvault_core::{StorageTier, StoredObject};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Bytes moved so far during a `put`.
///
/// `total` is `None` while the backend does not know the final size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub transferred: u64,
    pub total: Option<u64>,
}

impl TransferProgress {
    pub fn new(transferred: u64, total: Option<u64>) -> Self {
        Self { transferred, total }
    }

    /// Percentage in `[0, 100]`, or `None` when the total is unknown or zero.
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => {
                Some((self.transferred as f64 * 100.0 / total as f64).clamp(0.0, 100.0))
            }
            _ => None,
        }
    }
}

/// Callback invoked by backends as upload progress becomes known.
pub type ProgressCallback = Arc<dyn Fn(TransferProgress) + Send + Sync>;

/// A callback that discards progress events.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Tier-scoped object storage
///
/// All backends (S3, local filesystem) implement this trait so the upload
/// pipeline and the file list work with any of them. Keys passed in are
/// relative to the tier namespace; see the crate root documentation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist `data` under `key` in the tier namespace, reporting progress
    /// through `on_progress` as bytes are written.
    async fn put(
        &self,
        key: &str,
        tier: StorageTier,
        data: Bytes,
        on_progress: ProgressCallback,
    ) -> StorageResult<()>;

    /// List every object in the tier namespace. Backends page internally; the
    /// returned set is complete.
    async fn list(&self, tier: StorageTier) -> StorageResult<Vec<StoredObject>>;

    /// Generate a time-scoped URL for retrieving the object.
    async fn retrieval_url(
        &self,
        key: &str,
        tier: StorageTier,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Delete an object. Deleting a key that does not exist is `NotFound`.
    async fn delete(&self, key: &str, tier: StorageTier) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_requires_known_total() {
        assert_eq!(TransferProgress::new(10, None).percent(), None);
        assert_eq!(TransferProgress::new(0, Some(0)).percent(), None);
        assert_eq!(TransferProgress::new(50, Some(200)).percent(), Some(25.0));
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(TransferProgress::new(300, Some(200)).percent(), Some(100.0));
    }
}
