use crate::keys::KeyLayout;
use crate::traits::{ObjectStore, ProgressCallback, StorageError, StorageResult, TransferProgress};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use docvault_core::{StorageTier, StoredObject};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    layout: KeyLayout,
    chunk_size: usize,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/docvault")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/files")
    /// * `layout` - Tier namespace layout for the current identity
    /// * `chunk_size` - Bytes written between progress reports
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        layout: KeyLayout,
        chunk_size: usize,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            layout,
            chunk_size: chunk_size.max(1),
        })
    }

    /// Convert a full storage key to a filesystem path.
    ///
    /// Keys are validated by `KeyLayout`; this additionally refuses any
    /// existing path that resolves outside the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let path = self.base_path.join(storage_key);

        if let Ok(canonical) = path.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Walk `dir` recursively, collecting regular files.
    async fn collect_files(dir: PathBuf) -> StorageResult<Vec<(PathBuf, std::fs::Metadata)>> {
        let mut files = Vec::new();
        let mut pending = vec![dir];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StorageError::ListFailed(format!(
                        "Failed to read directory {}: {}",
                        dir.display(),
                        e
                    )))
                }
            };

            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                if metadata.is_dir() {
                    pending.push(entry.path());
                } else if metadata.is_file() {
                    files.push((entry.path(), metadata));
                }
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    async fn put(
        &self,
        key: &str,
        tier: StorageTier,
        data: Bytes,
        on_progress: ProgressCallback,
    ) -> StorageResult<()> {
        let storage_key = self.layout.object_key(tier, key)?;
        let path = self.key_to_path(&storage_key)?;
        let total = data.len() as u64;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        on_progress(TransferProgress::new(0, Some(total)));

        let mut written = 0u64;
        for chunk in data.chunks(self.chunk_size) {
            file.write_all(chunk).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            written += chunk.len() as u64;
            on_progress(TransferProgress::new(written, Some(total)));
        }

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            tier = %tier,
            size_bytes = total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn list(&self, tier: StorageTier) -> StorageResult<Vec<StoredObject>> {
        let prefix = self.layout.prefix(tier);
        let root = self.base_path.join(&prefix);
        let start = std::time::Instant::now();

        let files = Self::collect_files(root.clone()).await?;

        let mut objects = Vec::with_capacity(files.len());
        for (path, metadata) in files {
            let Ok(relative) = path.strip_prefix(&root) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let last_modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            objects.push(StoredObject::new(key, metadata.len(), last_modified));
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!(
            prefix = %prefix,
            count = objects.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage list successful"
        );

        Ok(objects)
    }

    async fn retrieval_url(
        &self,
        key: &str,
        tier: StorageTier,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        let storage_key = self.layout.object_key(tier, key)?;
        let path = self.key_to_path(&storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        Ok(self.generate_url(&storage_key))
    }

    async fn delete(&self, key: &str, tier: StorageTier) -> StorageResult<()> {
        let storage_key = self.layout.object_key(tier, key)?;
        let path = self.key_to_path(&storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::no_progress;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    async fn storage(dir: &Path, chunk_size: usize) -> LocalStorage {
        LocalStorage::new(
            dir,
            "http://localhost:3000/files".to_string(),
            KeyLayout::new("user-1"),
            chunk_size,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_then_list() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path(), 1024).await;

        storage
            .put(
                "invoice.pdf",
                StorageTier::Private,
                Bytes::from_static(b"%PDF-1.4 test"),
                no_progress(),
            )
            .await
            .unwrap();
        storage
            .put(
                "nested/notes.txt",
                StorageTier::Private,
                Bytes::from_static(b"hello"),
                no_progress(),
            )
            .await
            .unwrap();

        let objects = storage.list(StorageTier::Private).await.unwrap();
        let keys: Vec<_> = objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["invoice.pdf", "nested/notes.txt"]);
        assert_eq!(objects[0].size, 13);

        assert!(dir.path().join("private/user-1/invoice.pdf").exists());
    }

    #[tokio::test]
    async fn test_tiers_are_separate_namespaces() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path(), 1024).await;

        storage
            .put(
                "shared.pdf",
                StorageTier::Guest,
                Bytes::from_static(b"x"),
                no_progress(),
            )
            .await
            .unwrap();

        assert_eq!(storage.list(StorageTier::Guest).await.unwrap().len(), 1);
        assert!(storage.list(StorageTier::Private).await.unwrap().is_empty());
        assert!(storage.list(StorageTier::Protected).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_reports_chunked_progress() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path(), 4).await;
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        storage
            .put(
                "ten.bin",
                StorageTier::Guest,
                Bytes::from(vec![7u8; 10]),
                Arc::new(move |p| sink.lock().unwrap().push(p)),
            )
            .await
            .unwrap();

        let events = events.lock().unwrap();
        let transferred: Vec<u64> = events.iter().map(|p| p.transferred).collect();
        assert_eq!(transferred, vec![0, 4, 8, 10]);
        assert!(events.iter().all(|p| p.total == Some(10)));
    }

    #[tokio::test]
    async fn test_retrieval_url() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path(), 1024).await;

        storage
            .put(
                "a.pdf",
                StorageTier::Protected,
                Bytes::from_static(b"x"),
                no_progress(),
            )
            .await
            .unwrap();

        let url = storage
            .retrieval_url("a.pdf", StorageTier::Protected, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:3000/files/protected/user-1/a.pdf");

        let missing = storage
            .retrieval_url("b.pdf", StorageTier::Protected, Duration::from_secs(60))
            .await;
        assert!(matches!(missing, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path(), 1024).await;

        let result = storage.delete("gone.pdf", StorageTier::Private).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path(), 1024).await;

        storage
            .put(
                "a.pdf",
                StorageTier::Private,
                Bytes::from_static(b"x"),
                no_progress(),
            )
            .await
            .unwrap();
        storage.delete("a.pdf", StorageTier::Private).await.unwrap();

        assert!(storage.list(StorageTier::Private).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path(), 1024).await;

        let result = storage
            .put(
                "../../../etc/passwd",
                StorageTier::Guest,
                Bytes::from_static(b"x"),
                no_progress(),
            )
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("/etc/passwd", StorageTier::Guest).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
