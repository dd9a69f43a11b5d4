//! Image decoding with content-based format detection and size limits.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::{Dimensions, SourceImage};

use super::validate::Validator;

/// Turns raw uploads into decoded rasters.
pub struct ImageDecoder {
    limits: LimitsConfig,
    validator: Validator,
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded raster
    pub image: DynamicImage,
    /// Format detected from the content (not the declared media type)
    pub format: ImageFormat,
    /// Intrinsic pixel size
    pub dimensions: Dimensions,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            validator: Validator::new(limits.clone()),
            limits,
        }
    }

    /// Validate and decode a source image off the async runtime.
    ///
    /// The source buffer moves into the blocking task and is dropped there,
    /// whether decoding succeeds or fails.
    pub async fn decode(&self, source: SourceImage) -> Result<DecodedImage, PipelineError> {
        self.validator.validate(&source)?;

        let file_name = source.file_name().to_string();
        let declared = source.media_type().to_string();
        let bytes = source.into_bytes();

        let name = file_name.clone();
        let decoded = tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &name))
            .await
            .map_err(|e| PipelineError::Decode {
                file_name: file_name.clone(),
                message: format!("Task join error: {}", e),
            })??;

        if format_to_mime(decoded.format) != Some(declared.as_str()) {
            tracing::debug!(
                "{} declared as {} but decoded as {}",
                file_name,
                declared,
                format_to_string(decoded.format)
            );
        }

        let max_dim = self.limits.max_image_dimension;
        if decoded.dimensions.width > max_dim || decoded.dimensions.height > max_dim {
            return Err(PipelineError::Decode {
                file_name,
                message: format!(
                    "Image too large ({} > {}px)",
                    decoded.dimensions, max_dim
                ),
            });
        }

        Ok(decoded)
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    fn decode_bytes_sync(bytes: Vec<u8>, file_name: &str) -> Result<DecodedImage, PipelineError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                file_name: file_name.to_string(),
                message: format!("Cannot detect image format: {}", e),
            })?;

        let format = reader.format().ok_or_else(|| PipelineError::Decode {
            file_name: file_name.to_string(),
            message: "Unsupported image format".to_string(),
        })?;

        let image = reader.decode().map_err(|e| PipelineError::Decode {
            file_name: file_name.to_string(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::Decode {
                file_name: file_name.to_string(),
                message: format!("Image has no pixels ({}x{})", width, height),
            });
        }

        Ok(DecodedImage {
            image,
            format,
            dimensions: Dimensions::new(width, height),
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        _ => "unknown",
    }
}

fn format_to_mime(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::Tiff => Some("image/tiff"),
        ImageFormat::Bmp => Some("image/bmp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::png_bytes;

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[tokio::test]
    async fn test_decode_png() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let source = SourceImage::new(png_bytes(40, 30), "photo.png", "image/png");

        let decoded = decoder.decode(source).await.unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!(decoded.dimensions, Dimensions::new(40, 30));
    }

    #[tokio::test]
    async fn test_format_detected_by_content() {
        // A PNG uploaded as photo.jpg still decodes as PNG
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let source = SourceImage::new(png_bytes(8, 8), "photo.jpg", "image/jpeg");

        let decoded = decoder.decode(source).await.unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_zero_byte_input_fails() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let source = SourceImage::new(Vec::new(), "photo.png", "image/png");

        let err = decoder.decode(source).await.unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_truncated_png_fails() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let mut bytes = png_bytes(64, 64);
        bytes.truncate(40);
        let source = SourceImage::new(bytes, "broken.png", "image/png");

        let err = decoder.decode(source).await.unwrap_err();
        assert_eq!(err.stage(), "decode");
        assert!(err.to_string().contains("broken.png"));
    }

    #[tokio::test]
    async fn test_dimension_limit() {
        let limits = LimitsConfig {
            max_image_dimension: 32,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let source = SourceImage::new(png_bytes(64, 16), "wide.png", "image/png");

        let err = decoder.decode(source).await.unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
