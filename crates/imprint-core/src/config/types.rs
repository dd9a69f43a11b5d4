//! Sub-configuration structs with the deployment defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resize and encode settings for the publish pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum output width in pixels (images are never upscaled)
    pub max_width: u32,

    /// Maximum output height in pixels
    pub max_height: u32,

    /// JPEG quality factor in (0, 1]
    pub quality: f32,

    /// Colour transparent pixels are flattened onto before JPEG encoding.
    /// `#RRGGBB` or `#RRGGBBAA`; alpha is ignored.
    pub background: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_width: 1600,
            max_height: 1600,
            quality: 0.8,
            background: "#000000".to_string(),
        }
    }
}

/// Text watermark burned into every published image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Watermark text
    pub text: String,

    /// Global opacity multiplier applied to both passes, in [0, 1]
    pub opacity: f32,

    /// Fill colour (`#RRGGBBAA`)
    pub fill_color: String,

    /// Outline colour (`#RRGGBBAA`)
    pub stroke_color: String,

    /// Font size as a fraction of the shorter image edge
    pub size_ratio: f32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: "Placement Demo".to_string(),
            opacity: 1.0,
            // rgba(255,255,255,0.75)
            fill_color: "#FFFFFFBF".to_string(),
            // rgba(0,0,0,0.45)
            stroke_color: "#00000073".to_string(),
            size_ratio: 0.06,
        }
    }
}

/// Which object store implementation to publish to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Supabase storage HTTP API
    #[default]
    Supabase,
    /// Local directory tree
    Filesystem,
    /// In-process map (nothing survives the process)
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Supabase => write!(f, "supabase"),
            StorageBackend::Filesystem => write!(f, "filesystem"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Object store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend implementation
    pub backend: StorageBackend,

    /// Bucket every object is written to
    pub bucket: String,

    /// Prefix prepended to every generated key
    pub key_prefix: String,

    /// Cache-control max-age hint attached to uploaded objects, in seconds
    pub cache_control_secs: u64,

    /// Storage service endpoint (supabase backend)
    pub endpoint: String,

    /// Service key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Root directory (filesystem backend)
    pub root: PathBuf,

    /// Base URL objects are publicly served from.
    /// Defaults to the endpoint's public object route for supabase.
    pub public_base_url: Option<String>,

    /// Upload request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Supabase,
            bucket: "images".to_string(),
            key_prefix: "products/".to_string(),
            cache_control_secs: 3600,
            endpoint: "${SUPABASE_URL}".to_string(),
            api_key: "${SUPABASE_KEY}".to_string(),
            root: PathBuf::from("~/.imprint/objects"),
            public_base_url: None,
            request_timeout_ms: 30000,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum source file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 20000,
        }
    }
}

/// Admin REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the `/api/...` routes hang off (supports ${ENV_VAR} syntax)
    pub base_url: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "${IMPRINT_API_BASE_URL}".to_string(),
            timeout_ms: 15000,
        }
    }
}

/// Role identifiers issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Role identifier that grants administrator access
    pub admin_role_id: String,

    /// Role identifier assigned to ordinary customers
    pub customer_role_id: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_role_id: "41fc96df-063b-433b-96f7-b5efc6978825".to_string(),
            customer_role_id: "a5fbd39c-6a51-4f36-8c7f-d171f355cb56".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Parse a `#RRGGBB` or `#RRGGBBAA` colour into RGBA channels.
///
/// Six-digit colours are fully opaque.
pub fn parse_hex_color(value: &str) -> Option<[u8; 4]> {
    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some([channel(0)?, channel(2)?, channel(4)?, 255]),
        8 => Some([channel(0)?, channel(2)?, channel(4)?, channel(6)?]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FFFFFFBF"), Some([255, 255, 255, 191]));
        assert_eq!(parse_hex_color("#00000073"), Some([0, 0, 0, 115]));
        assert_eq!(parse_hex_color("#102030"), Some([16, 32, 48, 255]));
    }

    #[test]
    fn test_parse_hex_color_rejects_garbage() {
        assert_eq!(parse_hex_color("FFFFFF"), None);
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_storage_backend_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            backend: StorageBackend,
        }
        let w: Wrapper = toml::from_str("backend = \"filesystem\"").unwrap();
        assert_eq!(w.backend, StorageBackend::Filesystem);
    }
}
