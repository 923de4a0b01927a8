use crate::keys::KeyLayout;
use crate::traits::{ObjectStore, ProgressCallback, StorageError, StorageResult, TransferProgress};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use docvault_core::{StorageTier, StoredObject};
use futures::TryStreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    MultipartUpload, ObjectStore as _, ObjectStoreExt, PutPayload, Result as ObjectResult,
};
use std::time::Duration;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    layout: KeyLayout,
    part_size: usize,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `layout` - Tier namespace layout for the current identity
    /// * `part_size` - Multipart part size; payloads up to this size use a single PUT
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        layout: KeyLayout,
        part_size: usize,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            layout,
            part_size: part_size.max(1),
        })
    }

    async fn put_single(
        &self,
        location: &Path,
        data: Bytes,
        on_progress: &ProgressCallback,
    ) -> ObjectResult<()> {
        let total = data.len() as u64;
        on_progress(TransferProgress::new(0, Some(total)));
        self.store.put(location, PutPayload::from(data)).await?;
        on_progress(TransferProgress::new(total, Some(total)));
        Ok(())
    }

    async fn put_multipart_parts(
        &self,
        location: &Path,
        data: Bytes,
        on_progress: &ProgressCallback,
    ) -> ObjectResult<()> {
        let mut upload = self.store.put_multipart(location).await?;
        upload_parts(upload.as_mut(), location, data, self.part_size, on_progress).await
    }
}

/// Upload in `part_size` parts, reporting progress as each part completes.
///
/// Any failure after the upload was opened aborts it, so no parts are left
/// behind in the bucket.
async fn upload_parts(
    upload: &mut dyn MultipartUpload,
    location: &Path,
    data: Bytes,
    part_size: usize,
    on_progress: &ProgressCallback,
) -> ObjectResult<()> {
    let total = data.len() as u64;
    on_progress(TransferProgress::new(0, Some(total)));

    let mut offset = 0usize;
    while offset < data.len() {
        let end = (offset + part_size).min(data.len());
        let part = PutPayload::from(data.slice(offset..end));
        if let Err(e) = upload.put_part(part).await {
            abort_upload(upload, location).await;
            return Err(e);
        }
        offset = end;
        on_progress(TransferProgress::new(offset as u64, Some(total)));
    }

    if let Err(e) = upload.complete().await {
        abort_upload(upload, location).await;
        return Err(e);
    }
    Ok(())
}

async fn abort_upload(upload: &mut dyn MultipartUpload, location: &Path) {
    if let Err(e) = upload.abort().await {
        tracing::warn!(error = %e, key = %location, "S3 multipart abort failed");
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put(
        &self,
        key: &str,
        tier: StorageTier,
        data: Bytes,
        on_progress: ProgressCallback,
    ) -> StorageResult<()> {
        let storage_key = self.layout.object_key(tier, key)?;
        let size = data.len() as u64;
        let location = Path::from(storage_key.clone());

        let start = std::time::Instant::now();

        let result = if data.len() <= self.part_size {
            self.put_single(&location, data, &on_progress).await
        } else {
            self.put_multipart_parts(&location, data, &on_progress).await
        };

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            tier = %tier,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn list(&self, tier: StorageTier) -> StorageResult<Vec<StoredObject>> {
        let start = std::time::Instant::now();
        let prefix = Path::from(self.layout.prefix(tier));

        let metas: Vec<_> = self
            .store
            .list(Some(&prefix))
            .try_collect()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    prefix = %prefix,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 list failed"
                );
                StorageError::ListFailed(e.to_string())
            })?;

        let mut objects: Vec<StoredObject> = metas
            .into_iter()
            .filter_map(|meta| {
                self.layout
                    .relative_key(tier, meta.location.as_ref())
                    .map(|key| StoredObject::new(key, meta.size as u64, meta.last_modified))
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = objects.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(objects)
    }

    async fn retrieval_url(
        &self,
        key: &str,
        tier: StorageTier,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = Path::from(self.layout.object_key(tier, key)?);
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn delete(&self, key: &str, tier: StorageTier) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let storage_key = self.layout.object_key(tier, key)?;
        let location = Path::from(storage_key.clone());

        // S3 deletes are idempotent; a missing key must still surface as NotFound.
        match self.store.head(&location).await {
            Ok(_) => {}
            Err(ObjectStoreError::NotFound { .. }) => {
                return Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => return Err(StorageError::BackendError(e.to_string())),
        }

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
