//! JPEG serialization.
//!
//! JPEG has no alpha channel: transparent and translucent pixels are
//! flattened onto the configured background colour before encoding. This is
//! lossy and one-way; the published file never carries transparency.

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, Rgba, RgbaImage};

use crate::config::{parse_hex_color, PipelineConfig};
use crate::error::{ConfigError, PipelineError};
use crate::types::{Dimensions, EncodedArtifact, JPEG_MEDIA_TYPE};

/// Encodes composited rasters to JPEG at a fixed quality.
#[derive(Debug, Clone)]
pub struct Encoder {
    quality: f32,
    background: Rgb<u8>,
}

impl Encoder {
    /// Create an encoder from the pipeline settings.
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let [r, g, b, _] = parse_hex_color(&config.background).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "pipeline.background is not a #RRGGBB colour: {}",
                config.background
            ))
        })?;
        Ok(Self::with_quality(config.quality, Rgb([r, g, b])))
    }

    pub fn with_quality(quality: f32, background: Rgb<u8>) -> Self {
        Self {
            quality,
            background,
        }
    }

    /// Quality on the encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Flatten and encode. Consumes the raster.
    pub fn encode(&self, image: RgbaImage) -> Result<EncodedArtifact, PipelineError> {
        let dimensions = Dimensions::new(image.width(), image.height());
        let flat = self.flatten(&image);
        drop(image);

        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality());
        flat.write_with_encoder(encoder)
            .map_err(|e| PipelineError::Encode {
                message: e.to_string(),
            })?;

        if bytes.is_empty() {
            return Err(PipelineError::Encode {
                message: "encoder produced no output".to_string(),
            });
        }

        tracing::trace!(
            "  Encode: {} at q{} -> {} bytes",
            dimensions,
            self.jpeg_quality(),
            bytes.len()
        );

        Ok(EncodedArtifact {
            bytes,
            media_type: JPEG_MEDIA_TYPE,
            quality: self.quality,
            dimensions,
        })
    }

    /// Composite every pixel over the opaque background.
    fn flatten(&self, image: &RgbaImage) -> RgbImage {
        let Rgb(bg) = self.background;
        RgbImage::from_fn(image.width(), image.height(), |x, y| {
            let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
            if a == 255 {
                return Rgb([r, g, b]);
            }
            let alpha = a as u32;
            let mix = |src: u8, dst: u8| {
                ((src as u32 * alpha + dst as u32 * (255 - alpha) + 127) / 255) as u8
            };
            Rgb([mix(r, bg[0]), mix(g, bg[1]), mix(b, bg[2])])
        })
    }
}
