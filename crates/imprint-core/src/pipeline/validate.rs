//! Cheap checks on the raw upload before any decoding work.

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::SourceImage;

/// Validates source files before decoding.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Reject inputs that cannot possibly decode.
    ///
    /// Checks:
    /// - Buffer is non-empty
    /// - Size is within limits
    /// - Leading bytes carry a known raster signature
    pub fn validate(&self, source: &SourceImage) -> Result<(), PipelineError> {
        let reject = |message: String| PipelineError::Decode {
            file_name: source.file_name().to_string(),
            message,
        };

        if source.is_empty() {
            return Err(reject("Empty file (0 bytes)".to_string()));
        }

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if source.len() as u64 > max_bytes {
            return Err(reject(format!(
                "File too large ({}MB > {}MB)",
                source.len() as u64 / (1024 * 1024),
                self.limits.max_file_size_mb
            )));
        }

        if source.len() < 4 {
            return Err(reject("File too small to be a valid image".to_string()));
        }

        if sniff_format(source.bytes()).is_none() {
            return Err(reject(format!(
                "Unrecognized image format (declared {})",
                source.media_type()
            )));
        }

        Ok(())
    }
}

/// Identify a raster format from its leading bytes.
pub fn sniff_format(header: &[u8]) -> Option<&'static str> {
    match header {
        [0xFF, 0xD8, 0xFF, ..] => Some("jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("png"),
        [b'G', b'I', b'F', b'8', ..] => Some("gif"),
        [b'B', b'M', ..] => Some("bmp"),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some("tiff"),
        // RIFF container: only WebP is a raster we accept
        [b'R', b'I', b'F', b'F', rest @ ..] => match rest.get(4..8) {
            Some(b"WEBP") | None => Some("webp"),
            Some(_) => None,
        },
        _ => None,
    }
}
