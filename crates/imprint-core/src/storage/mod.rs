//! Object stores the publish pipeline writes to.
//!
//! Every backend follows the same write discipline: a put to an occupied
//! key fails with [`StoreError::AlreadyExists`] and never overwrites.

mod filesystem;
mod memory;
mod supabase;

pub use filesystem::FilesystemStore;
pub use memory::{MemoryStore, StoredObject};
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{resolve_env_var, Config, StorageBackend};
use crate::error::{ConfigError, StoreError};
use crate::types::StoragePath;

/// Metadata attached to a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// MIME type served with the object
    pub content_type: String,
    /// Cache-control max-age hint, in seconds
    pub cache_control_secs: u64,
}

impl ObjectMetadata {
    /// `Cache-Control` header value for this object.
    pub fn cache_control(&self) -> String {
        format!("max-age={}", self.cache_control_secs)
    }
}

/// A bucket/key addressed byte store.
///
/// Uses `async_trait` so stores can be shared as `Arc<dyn ObjectStore>`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Write `bytes` at `path`, failing if the key is already occupied.
    async fn put(
        &self,
        path: &StoragePath,
        bytes: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError>;

    /// Publicly retrievable URL for `path`, if the store exposes one.
    fn public_url(&self, path: &StoragePath) -> Option<String>;
}

/// Builds the configured store.
pub struct StoreFactory;

impl StoreFactory {
    /// Create the backend selected by `[storage] backend`.
    pub fn create(config: &Config) -> Result<Arc<dyn ObjectStore>, ConfigError> {
        let storage = &config.storage;
        match storage.backend {
            StorageBackend::Supabase => {
                let endpoint = resolve_env_var(&storage.endpoint).ok_or_else(|| {
                    ConfigError::ValidationError(
                        "storage.endpoint not set. Set SUPABASE_URL env var.".to_string(),
                    )
                })?;
                let api_key = resolve_env_var(&storage.api_key).ok_or_else(|| {
                    ConfigError::ValidationError(
                        "storage.api_key not set. Set SUPABASE_KEY env var.".to_string(),
                    )
                })?;
                let store = SupabaseStore::new(
                    &endpoint,
                    &api_key,
                    storage.public_base_url.as_deref(),
                    Duration::from_millis(storage.request_timeout_ms),
                )?;
                Ok(Arc::new(store))
            }
            StorageBackend::Filesystem => Ok(Arc::new(FilesystemStore::new(
                config.storage_root(),
                storage.public_base_url.clone(),
            ))),
            StorageBackend::Memory => Ok(Arc::new(MemoryStore::new(
                storage.public_base_url.clone(),
            ))),
        }
    }
}

/// Join a base URL and path segments with exactly one `/` between each.
pub(crate) fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(segment.trim_matches('/'));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_control_header() {
        let meta = ObjectMetadata {
            content_type: "image/jpeg".into(),
            cache_control_secs: 3600,
        };
        assert_eq!(meta.cache_control(), "max-age=3600");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://cdn.example.com/", &["images", "products/1_a.jpg"]),
            "https://cdn.example.com/images/products/1_a.jpg"
        );
        assert_eq!(join_url("http://x", &["/a/", "b"]), "http://x/a/b");
    }

    #[test]
    fn test_factory_memory_backend() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        let store = StoreFactory::create(&config).unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn test_factory_supabase_requires_endpoint() {
        let mut config = Config::default();
        config.storage.endpoint = "${IMPRINT_TEST_UNSET_ENDPOINT}".into();
        let err = StoreFactory::create(&config).err().unwrap();
        assert!(err.to_string().contains("storage.endpoint"));
    }

    #[test]
    fn test_factory_supabase_with_literal_settings() {
        let mut config = Config::default();
        config.storage.endpoint = "https://project.supabase.co".into();
        config.storage.api_key = "service-key".into();
        let store = StoreFactory::create(&config).unwrap();
        assert_eq!(store.name(), "supabase");
    }
}
