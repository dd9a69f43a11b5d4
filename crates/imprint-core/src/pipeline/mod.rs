//! Image publish pipeline.
//!
//! Stages, in the order [`ImagePublisher`] runs them:
//! - **validate**: Size and magic-byte checks before decoding
//! - **decode**: Content-sniffed decoding into a raster
//! - **resize**: Aspect-preserving downscale into the bounding box
//! - **watermark**: Centered outlined text burned into the pixels
//! - **encode**: Alpha flattening and JPEG serialization
//! - **upload**: Key naming, reject-on-collision write, public URL
//! - **processor**: Orchestrates the full pipeline

pub mod decode;
pub mod encode;
pub mod processor;
pub mod resize;
pub mod upload;
pub mod validate;
pub mod watermark;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use encode::Encoder;
pub use processor::{ImagePublisher, PublishOptions};
pub use resize::Resizer;
pub use upload::{now_millis, object_key, Uploader};
pub use validate::Validator;
pub use watermark::{WatermarkStyle, Watermarker};

#[cfg(test)]
pub(crate) mod test_support {
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    /// An opaque gradient PNG.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// A PNG whose alpha channel varies across the image.
    pub fn translucent_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([200, (y % 256) as u8, 40, (x % 256) as u8])
        });
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }
}
