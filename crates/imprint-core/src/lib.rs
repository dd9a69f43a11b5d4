//! Imprint Core - watermarked image publishing for a product catalog.
//!
//! Imprint takes a raw image upload, bounds its size, burns a text watermark
//! into it, re-encodes it as JPEG and writes it to an object store, returning
//! the public URL the catalog links to.
//!
//! # Architecture
//!
//! ```text
//! Image → Decode → Resize → Watermark → Encode (JPEG) → Upload → Public URL
//! ```
//!
//! Stages run strictly in order and the first failure aborts the call. The
//! store refuses writes to existing keys, so a failed call never leaves a
//! partial or overwritten object behind.
//!
//! # Usage
//!
//! ```rust,ignore
//! use imprint_core::{Config, Imprint, SourceImage};
//!
//! #[tokio::main]
//! async fn main() -> imprint_core::Result<()> {
//!     let imprint = Imprint::new(Config::load()?)?;
//!
//!     let source = SourceImage::read("./photo.png".as_ref()).await?;
//!     let published = imprint.publish(source).await?;
//!     println!("{}", published.url);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_http;

// Re-exports for convenient access
pub use api::ApiClient;
pub use config::Config;
pub use error::{
    ApiError, ConfigError, ImprintError, PipelineError, PipelineResult, Result, StoreError,
};
pub use pipeline::{ImagePublisher, PublishOptions};
pub use session::{Role, Session, SessionStore};
pub use storage::{ObjectStore, StoreFactory};
pub use types::{Dimensions, PublicUrl, PublishedImage, SourceImage, StoragePath};

use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Imprint - the main entry point for publishing images.
///
/// Owns the configuration and the object store every publish writes to.
pub struct Imprint {
    config: Config,
    store: Arc<dyn ObjectStore>,
}

impl Imprint {
    /// Create an instance writing to the configured store.
    pub fn new(config: Config) -> Result<Self> {
        let store = StoreFactory::create(&config)?;
        Ok(Self::with_store(config, store))
    }

    /// Create an instance writing to an explicit store.
    pub fn with_store(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        tracing::debug!("Initializing Imprint v{} ({} store)", VERSION, store.name());
        Self { config, store }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    /// Build a publisher with per-call location overrides.
    pub fn publisher(&self, options: PublishOptions) -> Result<ImagePublisher> {
        Ok(ImagePublisher::with_options(
            &self.config,
            self.store(),
            options,
        )?)
    }

    /// Publish one image with the configured bucket and prefix.
    pub async fn publish(&self, source: SourceImage) -> Result<PublishedImage> {
        let publisher = self.publisher(PublishOptions::default())?;
        Ok(publisher.publish(source).await?)
    }

    /// Admin API client for this configuration.
    pub fn api_client(&self) -> Result<ApiClient> {
        Ok(ApiClient::from_config(&self.config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_imprint_publish_with_memory_store() {
        let store = Arc::new(MemoryStore::default());
        let imprint = Imprint::with_store(Config::default(), store.clone());
        let source = SourceImage::new(
            pipeline::test_support::png_bytes(40, 40),
            "mug.png",
            "image/png",
        );

        let published = imprint.publish(source).await.unwrap();
        assert!(published.path.key.ends_with("_mug.jpg"));
        assert_eq!(store.len(), 1);
        assert_eq!(imprint.store().name(), "memory");
    }

    #[test]
    fn test_imprint_new_uses_configured_backend() {
        let mut config = Config::default();
        config.storage.backend = crate::config::StorageBackend::Memory;
        let imprint = Imprint::new(config).unwrap();
        assert_eq!(imprint.store().name(), "memory");
    }
}
