//! Error types for Imprint.
//!
//! Errors are organized by concern so callers can tell a content problem
//! (an undecodable upload) from an infrastructure problem (the object store
//! or the admin API refusing a request).

use thiserror::Error;

/// Top-level error type for Imprint operations.
#[derive(Error, Debug)]
pub enum ImprintError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Object store errors raised outside the pipeline
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Admin REST API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Image pipeline errors, one variant per stage.
///
/// Every variant is terminal for the invocation that raised it.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input is empty, corrupt, over a limit, or not a supported raster format
    #[error("Decode error for {file_name}: {message}")]
    Decode { file_name: String, message: String },

    /// Source geometry cannot be scaled
    #[error("Resize error: invalid source dimensions {width}x{height}")]
    Resize { width: u32, height: u32 },

    /// Watermark surface could not be allocated
    #[error("Render error: {message}")]
    Render { message: String },

    /// JPEG serialization failed
    #[error("Encode error: {message}")]
    Encode { message: String },

    /// Object store rejected the write (including an existing key)
    #[error("Upload error for {key}: {message}")]
    Upload { key: String, message: String },

    /// Write succeeded but no public URL could be derived
    #[error("Failed to obtain public URL for {bucket}/{key}")]
    UrlResolution { bucket: String, key: String },
}

impl PipelineError {
    /// Name of the stage that raised this error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Resize { .. } => "resize",
            Self::Render { .. } => "render",
            Self::Encode { .. } => "encode",
            Self::Upload { .. } => "upload",
            Self::UrlResolution { .. } => "url_resolution",
        }
    }

    /// True when the input itself is at fault rather than the environment.
    pub fn is_content_error(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Resize { .. })
    }
}

/// Errors raised by an [`ObjectStore`](crate::storage::ObjectStore) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The key is already occupied; the store never overwrites
    #[error("The resource already exists: {bucket}/{key}")]
    AlreadyExists { bucket: String, key: String },

    /// The store answered but refused the request
    #[error("Store responded with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The request never reached the store or the response was lost
    #[error("Store request failed: {0}")]
    Transport(String),

    /// Local I/O failure (filesystem backend)
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Admin REST API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Server answered with a non-success status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Request could not be sent or the response body could not be read
    #[error("Request failed: {0}")]
    Transport(String),

    /// Response body did not match the expected envelope
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The session does not carry the role this operation needs
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// No session is stored; log in first
    #[error("Not logged in")]
    NoSession,

    /// A raw image was given but no object store is configured to publish it
    #[error("No image publisher available for {0}")]
    NoPublisher(String),

    /// Image attached to a product failed to publish
    #[error("Image upload failed: {0}")]
    Image(#[from] PipelineError),
}

/// Convenience type alias for Imprint results.
pub type Result<T> = std::result::Result<T, ImprintError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
