//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{parse_hex_color, Config};

/// Stroke cost grows with the square of the font size.
const MAX_SIZE_RATIO: f32 = 0.5;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.max_width == 0 || self.pipeline.max_height == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_width and pipeline.max_height must be > 0".into(),
            ));
        }
        if !(self.pipeline.quality > 0.0 && self.pipeline.quality <= 1.0) {
            return Err(ConfigError::ValidationError(
                "pipeline.quality must be in (0.0, 1.0]".into(),
            ));
        }
        if parse_hex_color(&self.pipeline.background).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "pipeline.background is not a #RRGGBB colour: {}",
                self.pipeline.background
            )));
        }
        if !(0.0..=1.0).contains(&self.watermark.opacity) {
            return Err(ConfigError::ValidationError(
                "watermark.opacity must be between 0.0 and 1.0".into(),
            ));
        }
        if !(self.watermark.size_ratio > 0.0 && self.watermark.size_ratio <= MAX_SIZE_RATIO) {
            return Err(ConfigError::ValidationError(format!(
                "watermark.size_ratio must be in (0.0, {MAX_SIZE_RATIO}]"
            )));
        }
        for (field, value) in [
            ("watermark.fill_color", &self.watermark.fill_color),
            ("watermark.stroke_color", &self.watermark.stroke_color),
        ] {
            if parse_hex_color(value).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "{field} is not a #RRGGBBAA colour: {value}"
                )));
            }
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.bucket must not be empty".into(),
            ));
        }
        if self.storage.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "storage.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}
