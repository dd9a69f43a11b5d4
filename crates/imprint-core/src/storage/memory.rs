//! In-process object store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{join_url, ObjectMetadata, ObjectStore};
use crate::error::StoreError;
use crate::types::StoragePath;

/// A stored object and its metadata.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub metadata: ObjectMetadata,
}

/// Keeps objects in a map for the lifetime of the process.
///
/// Without a public base URL objects resolve to `memory://bucket/key`.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<StoragePath, StoredObject>>,
    public_base: Option<String>,
}

impl MemoryStore {
    pub fn new(public_base: Option<String>) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            public_base,
        }
    }

    /// Fetch a copy of a stored object.
    pub fn get(&self, path: &StoragePath) -> Option<StoredObject> {
        self.lock().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<StoragePath, StoredObject>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(
        &self,
        path: &StoragePath,
        bytes: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        let mut objects = self.lock();
        if objects.contains_key(path) {
            return Err(StoreError::AlreadyExists {
                bucket: path.bucket.clone(),
                key: path.key.clone(),
            });
        }
        objects.insert(
            path.clone(),
            StoredObject {
                bytes,
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }

    fn public_url(&self, path: &StoragePath) -> Option<String> {
        match &self.public_base {
            Some(base) => Some(join_url(base, &[&path.bucket, &path.key])),
            None => Some(format!("memory://{}/{}", path.bucket, path.key)),
        }
    }
}
