//! Object key naming and the final write to the object store.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::StorageConfig;
use crate::error::PipelineError;
use crate::storage::{ObjectMetadata, ObjectStore};
use crate::types::{EncodedArtifact, PublicUrl, StoragePath};

/// Build the object key for an upload.
///
/// `<prefix><timestamp_ms>_<name without extension>.jpg`. Only the last
/// extension is dropped, and only when something follows the dot.
pub fn object_key(prefix: &str, timestamp_ms: u128, file_name: &str) -> String {
    format!("{}{}_{}.jpg", prefix, timestamp_ms, strip_extension(file_name))
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() => &file_name[..dot],
        _ => file_name,
    }
}

/// Current Unix time in milliseconds.
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Writes encoded artifacts and resolves their public URLs.
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    key_prefix: String,
    cache_control_secs: u64,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            bucket: config.bucket.clone(),
            key_prefix: config.key_prefix.clone(),
            cache_control_secs: config.cache_control_secs,
        }
    }

    /// Use a different bucket than the configured one.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Use a different key prefix than the configured one.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Storage location for `file_name` uploaded at `timestamp_ms`.
    pub fn storage_path(&self, file_name: &str, timestamp_ms: u128) -> StoragePath {
        StoragePath::new(
            self.bucket.clone(),
            object_key(&self.key_prefix, timestamp_ms, file_name),
        )
    }

    /// Write the artifact at `path` and resolve its public URL.
    ///
    /// A write to an occupied key fails; nothing is retried.
    pub async fn upload(
        &self,
        artifact: EncodedArtifact,
        path: &StoragePath,
    ) -> Result<PublicUrl, PipelineError> {
        let metadata = ObjectMetadata {
            content_type: artifact.media_type.to_string(),
            cache_control_secs: self.cache_control_secs,
        };

        self.store
            .put(path, artifact.bytes, &metadata)
            .await
            .map_err(|e| PipelineError::Upload {
                key: path.key.clone(),
                message: e.to_string(),
            })?;

        match self.store.public_url(path) {
            Some(url) if !url.is_empty() => Ok(PublicUrl::new(url)),
            _ => Err(PipelineError::UrlResolution {
                bucket: path.bucket.clone(),
                key: path.key.clone(),
            }),
        }
    }
}
