//! Pipeline orchestration - wires the publish stages together.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{ConfigError, PipelineError, PipelineResult};
use crate::storage::ObjectStore;
use crate::types::{Dimensions, PublishedImage, SourceImage};

use super::decode::{format_to_string, ImageDecoder};
use super::encode::Encoder;
use super::resize::Resizer;
use super::upload::{now_millis, Uploader};
use super::watermark::{font_size, WatermarkStyle, Watermarker};

/// Per-call overrides of the configured upload location.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Bucket to write to instead of `[storage] bucket`
    pub bucket: Option<String>,
    /// Key prefix to use instead of `[storage] key_prefix`
    pub prefix: Option<String>,
}

/// Runs one image through decode, resize, watermark, encode and upload.
///
/// Holds no per-call state, so one publisher can serve concurrent calls.
pub struct ImagePublisher {
    decoder: ImageDecoder,
    resizer: Resizer,
    watermarker: Watermarker,
    encoder: Encoder,
    uploader: Uploader,
}

impl ImagePublisher {
    /// Create a publisher that writes to `store`.
    pub fn new(config: &Config, store: Arc<dyn ObjectStore>) -> Result<Self, ConfigError> {
        Self::with_options(config, store, PublishOptions::default())
    }

    /// Create a publisher with upload location overrides.
    pub fn with_options(
        config: &Config,
        store: Arc<dyn ObjectStore>,
        options: PublishOptions,
    ) -> Result<Self, ConfigError> {
        let mut uploader = Uploader::new(store, &config.storage);
        if let Some(bucket) = options.bucket {
            uploader = uploader.with_bucket(bucket);
        }
        if let Some(prefix) = options.prefix {
            uploader = uploader.with_prefix(prefix);
        }

        Ok(Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            resizer: Resizer::new(&config.pipeline),
            watermarker: Watermarker::new(WatermarkStyle::from_config(&config.watermark)?),
            encoder: Encoder::new(&config.pipeline)?,
            uploader,
        })
    }

    /// Name of the object store this publisher writes to.
    pub fn store_name(&self) -> &str {
        self.uploader.store_name()
    }

    /// Publish a source image and return where it can be fetched.
    ///
    /// Stages run strictly in order and the first failure aborts the call.
    /// Nothing is written unless every stage before the upload succeeded.
    pub async fn publish(&self, source: SourceImage) -> PipelineResult<PublishedImage> {
        let start = Instant::now();
        let source_name = source.file_name().to_string();
        tracing::debug!("Publishing: {} ({} bytes)", source_name, source.len());

        // Decode
        let decode_start = Instant::now();
        let decoded = self.decoder.decode(source).await?;
        let source_dimensions = decoded.dimensions;
        tracing::trace!(
            "  Decode: {:?} ({}, {})",
            decode_start.elapsed(),
            format_to_string(decoded.format),
            source_dimensions
        );

        // Resize
        let resize_start = Instant::now();
        let resizer = self.resizer.clone();
        let resized = run_blocking(
            move || resizer.resize(decoded.image),
            |_| PipelineError::Resize {
                width: source_dimensions.width,
                height: source_dimensions.height,
            },
        )
        .await?;
        let output_dimensions = Dimensions::new(resized.width(), resized.height());
        tracing::trace!("  Resize: {:?}", resize_start.elapsed());

        // Watermark
        let render_start = Instant::now();
        let size_ratio = self.watermarker.style().size_ratio;
        let watermark_font_size = font_size(output_dimensions, size_ratio);
        let watermarker = self.watermarker.clone();
        let composited = run_blocking(
            move || watermarker.apply(resized),
            |message| PipelineError::Render { message },
        )
        .await?;
        tracing::trace!("  Watermark: {:?}", render_start.elapsed());

        // Encode
        let encode_start = Instant::now();
        let encoder = self.encoder.clone();
        let artifact = run_blocking(
            move || encoder.encode(composited),
            |message| PipelineError::Encode { message },
        )
        .await?;
        let byte_size = artifact.bytes.len();
        let content_hash = blake3::hash(&artifact.bytes).to_hex().to_string();
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        // Upload
        let upload_start = Instant::now();
        let path = self.uploader.storage_path(&source_name, now_millis());
        let url = self.uploader.upload(artifact, &path).await?;
        tracing::trace!("  Upload: {:?}", upload_start.elapsed());

        tracing::info!(
            "Published {} as {} ({} -> {}, {} bytes) in {:?}",
            source_name,
            path,
            source_dimensions,
            output_dimensions,
            byte_size,
            start.elapsed()
        );

        Ok(PublishedImage {
            url,
            path,
            source_name,
            source_dimensions,
            output_dimensions,
            watermark_font_size,
            byte_size,
            content_hash,
        })
    }
}

/// Run a CPU-bound stage on the blocking pool.
async fn run_blocking<T, F, E>(stage: F, on_join_error: E) -> PipelineResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> PipelineResult<T> + Send + 'static,
    E: FnOnce(String) -> PipelineError,
{
    tokio::task::spawn_blocking(stage)
        .await
        .map_err(|e| on_join_error(format!("Task join error: {}", e)))?
}
