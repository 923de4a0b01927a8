//! Listing, download links, and deletion for one tier at a time

use docvault_core::{StorageTier, StoredObject};
use docvault_storage::{ObjectStore, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const EMPTY_STATE_MESSAGE: &str = "No files uploaded yet";

/// Owns the displayed set of stored objects and the single selection.
///
/// The set is only ever replaced wholesale by a successful refresh; failures
/// leave it as it was.
pub struct FileListController {
    storage: Arc<dyn ObjectStore>,
    url_ttl: Duration,
    items: Vec<StoredObject>,
    selection: Option<String>,
}

impl FileListController {
    pub fn new(storage: Arc<dyn ObjectStore>, url_ttl: Duration) -> Self {
        Self {
            storage,
            url_ttl,
            items: Vec::new(),
            selection: None,
        }
    }

    pub fn items(&self) -> &[StoredObject] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn select(&mut self, key: impl Into<String>) {
        self.selection = Some(key.into());
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Download and delete act on the selection, so they are only enabled with one.
    pub fn actions_enabled(&self) -> bool {
        self.selection.is_some()
    }

    /// Replace the set with the tier's full listing.
    ///
    /// On failure the previous set is kept and the error is returned for
    /// inspection; callers are not expected to surface it.
    pub async fn refresh(&mut self, tier: StorageTier) -> StorageResult<()> {
        let start = Instant::now();
        match self.storage.list(tier).await {
            Ok(items) => {
                debug!(
                    tier = %tier,
                    count = items.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "File list refreshed"
                );
                self.items = items;
                if let Some(selected) = &self.selection {
                    if !self.items.iter().any(|item| &item.key == selected) {
                        self.selection = None;
                    }
                }
                Ok(())
            }
            Err(e) => {
                warn!(tier = %tier, error = %e, "Failed to list files");
                Err(e)
            }
        }
    }

    /// Time-limited retrieval URL for `key`, or `None` when it cannot be issued.
    pub async fn download_link(&self, key: &str, tier: StorageTier) -> Option<String> {
        match self.storage.retrieval_url(key, tier, self.url_ttl).await {
            Ok(url) => {
                debug!(key = %key, tier = %tier, ttl_secs = self.url_ttl.as_secs(), "Issued download link");
                Some(url)
            }
            Err(e) => {
                warn!(key = %key, tier = %tier, error = %e, "Failed to create download link");
                None
            }
        }
    }

    /// Delete `key`, then refresh. A failed delete leaves the set untouched.
    ///
    /// Only the delete itself decides the result: a failing follow-up refresh
    /// is logged by `refresh` and keeps the previous set.
    pub async fn delete(&mut self, key: &str, tier: StorageTier) -> StorageResult<()> {
        if let Err(e) = self.storage.delete(key, tier).await {
            warn!(key = %key, tier = %tier, error = %e, "Failed to delete file");
            return Err(e);
        }
        info!(key = %key, tier = %tier, "File deleted");
        if self.selection.as_deref() == Some(key) {
            self.selection = None;
        }
        let _ = self.refresh(tier).await;
        Ok(())
    }

    /// Download link for the selection; `None` when nothing is selected.
    pub async fn download_selected(&self, tier: StorageTier) -> Option<String> {
        let key = self.selection.as_deref()?;
        self.download_link(key, tier).await
    }

    /// Delete the selection; a no-op when nothing is selected.
    pub async fn delete_selected(&mut self, tier: StorageTier) -> StorageResult<()> {
        let Some(key) = self.selection.clone() else {
            return Ok(());
        };
        self.delete(&key, tier).await
    }
}
