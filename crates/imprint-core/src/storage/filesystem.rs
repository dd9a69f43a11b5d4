//! Object store backed by a local directory tree.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::{join_url, ObjectMetadata, ObjectStore};
use crate::error::StoreError;
use crate::types::StoragePath;

/// Writes objects to `root/<bucket>/<key>`.
///
/// Objects only have a public URL when `public_base` is configured (for
/// example when the root is served by a static web server).
pub struct FilesystemStore {
    root: PathBuf,
    public_base: Option<String>,
}

impl FilesystemStore {
    pub fn new(root: PathBuf, public_base: Option<String>) -> Self {
        Self { root, public_base }
    }

    fn object_path(&self, path: &StoragePath) -> Result<PathBuf, StoreError> {
        if !is_plain_segment(&path.bucket) {
            return Err(StoreError::Rejected {
                status: 400,
                message: format!("invalid bucket: {}", path.bucket),
            });
        }
        let mut full = self.root.join(&path.bucket);
        for part in path.key.split('/') {
            if !is_plain_segment(part) {
                return Err(StoreError::Rejected {
                    status: 400,
                    message: format!("invalid object key: {}", path.key),
                });
            }
            full.push(part);
        }
        Ok(full)
    }
}

/// A single normal path component: no separators, roots or dot entries.
fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == segment
    )
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn put(
        &self,
        path: &StoragePath,
        bytes: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        let target = self.object_path(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tracing::debug!(
            "Storing {} ({}, {}) @ {:?}",
            path,
            metadata.content_type,
            metadata.cache_control(),
            &target
        );

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists {
                    bucket: path.bucket.clone(),
                    key: path.key.clone(),
                })
            }
            Err(other) => return Err(other.into()),
        };

        let written = async {
            file.write_all(&bytes).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            // Leave nothing behind for a write that did not complete
            drop(file);
            let _ = tokio::fs::remove_file(&target).await;
            return Err(e.into());
        }

        Ok(())
    }

    fn public_url(&self, path: &StoragePath) -> Option<String> {
        self.public_base
            .as_deref()
            .map(|base| join_url(base, &[&path.bucket, &path.key]))
    }
}
