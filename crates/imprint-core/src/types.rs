//! Core data types for the Imprint publish pipeline.
//!
//! These types carry one image from the caller's raw bytes to a publicly
//! served JPEG.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Media type of every artifact the pipeline produces.
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// A raw image file as handed over by the caller.
///
/// Immutable once read and owned by the invocation that received it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    bytes: Vec<u8>,
    media_type: String,
    file_name: String,
}

impl SourceImage {
    /// Wrap an in-memory file.
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }

    /// Read a file from disk, guessing the declared media type from its extension.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let media_type = media_type_for_name(&file_name).to_string();
        Ok(Self::new(bytes, file_name, media_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the source, handing its buffer to the decoder.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Guess a media type from a file name's extension.
pub fn media_type_for_name(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Width and height of a raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The shorter of the two edges.
    pub fn min_edge(&self) -> u32 {
        self.width.min(self.height)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A compressed, upload-ready image.
#[derive(Debug, Clone)]
pub struct EncodedArtifact {
    /// JPEG byte stream
    pub bytes: Vec<u8>,
    /// Always [`JPEG_MEDIA_TYPE`]
    pub media_type: &'static str,
    /// Quality factor the stream was encoded at, in (0, 1]
    pub quality: f32,
    /// Pixel size of the encoded image
    pub dimensions: Dimensions,
}

/// Where an artifact lives inside the object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoragePath {
    pub bucket: String,
    pub key: String,
}

impl StoragePath {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Publicly retrievable URL of a stored artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicUrl(String);

impl PublicUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PublicUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Report of one successful publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedImage {
    /// Public URL of the stored JPEG
    pub url: PublicUrl,

    /// Bucket and key the JPEG was written to
    pub path: StoragePath,

    /// Original file name as supplied by the caller
    pub source_name: String,

    /// Decoded size of the source image
    pub source_dimensions: Dimensions,

    /// Size of the published image
    pub output_dimensions: Dimensions,

    /// Watermark font size in pixels
    pub watermark_font_size: u32,

    /// Encoded size in bytes
    pub byte_size: usize,

    /// BLAKE3 hash of the published bytes
    pub content_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_for_name() {
        assert_eq!(media_type_for_name("photo.PNG"), "image/png");
        assert_eq!(media_type_for_name("shot.jpeg"), "image/jpeg");
        assert_eq!(media_type_for_name("README"), "application/octet-stream");
    }

    #[test]
    fn test_dimensions_min_edge() {
        assert_eq!(Dimensions::new(3000, 2000).min_edge(), 2000);
        assert_eq!(Dimensions::new(10, 40).to_string(), "10x40");
    }

    #[test]
    fn test_public_url_serializes_as_string() {
        let url = PublicUrl::new("https://cdn.example.com/images/a.jpg");
        let json = serde_json::to_string(&url).unwrap();
        assert_eq!(json, "\"https://cdn.example.com/images/a.jpg\"");
    }

    #[tokio::test]
    async fn test_source_image_read_guesses_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let source = SourceImage::read(&path).await.unwrap();
        assert_eq!(source.file_name(), "photo.png");
        assert_eq!(source.media_type(), "image/png");
        assert_eq!(source.len(), 3);
    }
}
