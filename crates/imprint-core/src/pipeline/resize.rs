//! Bounded downscaling that preserves aspect ratio.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::types::Dimensions;

/// Scales rasters down to fit inside a bounding box. Never upscales.
#[derive(Debug, Clone)]
pub struct Resizer {
    max_width: u32,
    max_height: u32,
    filter: FilterType,
}

impl Resizer {
    /// Create a resizer with the configured bounds.
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_bounds(config.max_width, config.max_height)
    }

    /// Create a resizer with explicit bounds.
    pub fn with_bounds(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
            filter: FilterType::CatmullRom,
        }
    }

    /// Compute the output size for a source of the given size.
    ///
    /// `ratio = min(max_w / w, max_h / h, 1.0)`; each edge is `round(edge * ratio)`
    /// using round-half-away-from-zero, and never drops below one pixel.
    pub fn target_dimensions(&self, source: Dimensions) -> Result<Dimensions, PipelineError> {
        if source.width == 0 || source.height == 0 {
            return Err(PipelineError::Resize {
                width: source.width,
                height: source.height,
            });
        }

        let ratio = self.ratio(source);
        if ratio >= 1.0 {
            return Ok(source);
        }

        let scale = |edge: u32| ((edge as f64 * ratio).round() as u32).max(1);
        Ok(Dimensions::new(scale(source.width), scale(source.height)))
    }

    /// Scale factor applied to both edges, clamped to 1.0.
    pub fn ratio(&self, source: Dimensions) -> f64 {
        let by_width = self.max_width as f64 / source.width as f64;
        let by_height = self.max_height as f64 / source.height as f64;
        by_width.min(by_height).min(1.0)
    }

    /// Resample the image to its target size in a single pass.
    ///
    /// Images already inside the bounds are returned untouched.
    pub fn resize(&self, image: DynamicImage) -> Result<DynamicImage, PipelineError> {
        let (width, height) = image.dimensions();
        let source = Dimensions::new(width, height);
        let target = self.target_dimensions(source)?;

        if target == source {
            tracing::trace!("  Resize: {} within bounds, skipped", source);
            return Ok(image);
        }

        tracing::trace!("  Resize: {} -> {}", source, target);
        Ok(image.resize_exact(target.width, target.height, self.filter))
    }
}
