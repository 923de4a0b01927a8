//! In-memory object store for tests
//!
//! Behaves like the real backends (same key layout, `NotFound` on missing
//! deletes) and lets tests inject failures per operation.

use crate::keys::KeyLayout;
use crate::traits::{ObjectStore, ProgressCallback, StorageError, StorageResult, TransferProgress};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use docvault_core::{StorageTier, StoredObject};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct Failures {
    put: bool,
    list: bool,
    url: bool,
    delete: bool,
}

/// Mock object store for testing without a backend
#[derive(Clone)]
pub struct MemoryStorage {
    layout: KeyLayout,
    objects: Arc<Mutex<BTreeMap<String, (Bytes, DateTime<Utc>)>>>,
    failures: Arc<Mutex<Failures>>,
    chunk_size: usize,
    report_total: bool,
    list_calls: Arc<AtomicUsize>,
    put_calls: Arc<AtomicUsize>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            layout: KeyLayout::new("test-identity"),
            objects: Arc::new(Mutex::new(BTreeMap::new())),
            failures: Arc::new(Mutex::new(Failures::default())),
            chunk_size: 1024 * 1024,
            report_total: true,
            list_calls: Arc::new(AtomicUsize::new(0)),
            put_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report progress every `chunk_size` bytes.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Report progress events without a known total size.
    pub fn without_total(mut self) -> Self {
        self.report_total = false;
        self
    }

    /// Seed an object directly, bypassing `put`.
    pub fn insert(&self, tier: StorageTier, key: &str, data: impl Into<Bytes>) {
        let full = format!("{}{}", self.layout.prefix(tier), key);
        self.objects
            .lock()
            .unwrap()
            .insert(full, (data.into(), Utc::now()));
    }

    /// Remove an object behind the store's back, as another client would.
    pub fn remove_out_of_band(&self, tier: StorageTier, key: &str) {
        let full = format!("{}{}", self.layout.prefix(tier), key);
        self.objects.lock().unwrap().remove(&full);
    }

    pub fn get(&self, tier: StorageTier, key: &str) -> Option<Bytes> {
        let full = format!("{}{}", self.layout.prefix(tier), key);
        self.objects
            .lock()
            .unwrap()
            .get(&full)
            .map(|(data, _)| data.clone())
    }

    pub fn fail_puts(&self, fail: bool) {
        self.failures.lock().unwrap().put = fail;
    }

    pub fn fail_lists(&self, fail: bool) {
        self.failures.lock().unwrap().list = fail;
    }

    pub fn fail_urls(&self, fail: bool) {
        self.failures.lock().unwrap().url = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.failures.lock().unwrap().delete = fail;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStorage {
    async fn put(
        &self,
        key: &str,
        tier: StorageTier,
        data: Bytes,
        on_progress: ProgressCallback,
    ) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        let full = self.layout.object_key(tier, key)?;
        let total = data.len() as u64;
        let reported_total = self.report_total.then_some(total);

        let mut sent = 0u64;
        for chunk in data.chunks(self.chunk_size) {
            tokio::task::yield_now().await;
            sent += chunk.len() as u64;
            on_progress(TransferProgress::new(sent, reported_total));
        }

        if self.failures.lock().unwrap().put {
            return Err(StorageError::UploadFailed("injected put failure".into()));
        }

        self.objects
            .lock()
            .unwrap()
            .insert(full, (data, Utc::now()));
        Ok(())
    }

    async fn list(&self, tier: StorageTier) -> StorageResult<Vec<StoredObject>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.lock().unwrap().list {
            return Err(StorageError::ListFailed("injected list failure".into()));
        }

        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .filter_map(|(full, (data, modified))| {
                self.layout
                    .relative_key(tier, full)
                    .map(|key| StoredObject::new(key, data.len() as u64, *modified))
            })
            .collect())
    }

    async fn retrieval_url(
        &self,
        key: &str,
        tier: StorageTier,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if self.failures.lock().unwrap().url {
            return Err(StorageError::BackendError("injected url failure".into()));
        }
        let full = self.layout.object_key(tier, key)?;
        if !self.objects.lock().unwrap().contains_key(&full) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!(
            "memory://{}?expires_in={}",
            full,
            expires_in.as_secs()
        ))
    }

    async fn delete(&self, key: &str, tier: StorageTier) -> StorageResult<()> {
        if self.failures.lock().unwrap().delete {
            return Err(StorageError::DeleteFailed("injected delete failure".into()));
        }
        let full = self.layout.object_key(tier, key)?;
        match self.objects.lock().unwrap().remove(&full) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
