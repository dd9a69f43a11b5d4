//! Centered text watermark, drawn as an outline pass followed by a fill pass.
//!
//! Glyphs come from an 8x8 bitmap font scaled to the derived font size, so
//! rendering needs no font files and is identical on every host.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};

use crate::config::{parse_hex_color, WatermarkConfig};
use crate::error::{ConfigError, PipelineError};
use crate::types::Dimensions;

/// Smallest font size ever rendered, in pixels.
pub const MIN_FONT_SIZE: u32 = 12;

/// Outline width as a fraction of the font size.
const STROKE_RATIO: f32 = 0.12;

/// Glyph grid size of the bitmap font.
const GLYPH_CELLS: f32 = 8.0;

/// Resolved watermark settings.
#[derive(Debug, Clone)]
pub struct WatermarkStyle {
    pub text: String,
    pub opacity: f32,
    pub stroke_color: Rgba<u8>,
    pub fill_color: Rgba<u8>,
    pub size_ratio: f32,
}

impl WatermarkStyle {
    /// Resolve colours from the config strings.
    pub fn from_config(config: &WatermarkConfig) -> Result<Self, ConfigError> {
        let color = |field: &str, value: &str| {
            parse_hex_color(value).map(Rgba).ok_or_else(|| {
                ConfigError::ValidationError(format!("{field} is not a #RRGGBBAA colour: {value}"))
            })
        };
        Ok(Self {
            text: config.text.clone(),
            opacity: config.opacity.clamp(0.0, 1.0),
            stroke_color: color("watermark.stroke_color", &config.stroke_color)?,
            fill_color: color("watermark.fill_color", &config.fill_color)?,
            size_ratio: config.size_ratio,
        })
    }
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            text: "Placement Demo".to_string(),
            opacity: 1.0,
            stroke_color: Rgba([0, 0, 0, 115]),
            fill_color: Rgba([255, 255, 255, 191]),
            size_ratio: 0.06,
        }
    }
}

/// Font size for a raster: `max(12, round(min(w, h) * size_ratio))`.
pub fn font_size(dimensions: Dimensions, size_ratio: f32) -> u32 {
    let scaled = (dimensions.min_edge() as f64 * size_ratio as f64).round() as u32;
    scaled.max(MIN_FONT_SIZE)
}

/// Outline width for a font size: `max(1, round(font_size * 0.12))`.
pub fn stroke_width(font_size: u32) -> u32 {
    ((font_size as f32 * STROKE_RATIO).round() as u32).max(1)
}

/// Burns a [`WatermarkStyle`] into rasters.
#[derive(Debug, Clone)]
pub struct Watermarker {
    style: WatermarkStyle,
}

impl Watermarker {
    pub fn new(style: WatermarkStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &WatermarkStyle {
        &self.style
    }

    /// Composite the watermark at the centre of the image.
    ///
    /// Consumes the input; the returned buffer is the sole owner of the pixels.
    pub fn apply(&self, image: DynamicImage) -> Result<RgbaImage, PipelineError> {
        let mut canvas = image.into_rgba8();
        let dims = Dimensions::new(canvas.width(), canvas.height());
        if dims.width == 0 || dims.height == 0 {
            return Err(PipelineError::Render {
                message: format!("cannot draw on an empty {} surface", dims),
            });
        }

        let glyphs: Vec<[u8; 8]> = self.style.text.chars().map(glyph_for).collect();
        if glyphs.is_empty() {
            return Ok(canvas);
        }

        let size = font_size(dims, self.style.size_ratio);
        let layout = TextLayout::centered(dims, size, glyphs.len());
        let fill = layout.rasterize(&glyphs)?;
        let stroke = fill.dilate(stroke_width(size).div_ceil(2))?;

        tracing::trace!(
            "  Watermark: {:?} at {}px, stroke {}px",
            self.style.text,
            size,
            stroke_width(size)
        );

        // Outline first so the fill sits on top of it
        stroke.paint(&mut canvas, self.faded(self.style.stroke_color));
        fill.paint(&mut canvas, self.faded(self.style.fill_color));

        Ok(canvas)
    }

    fn faded(&self, color: Rgba<u8>) -> Rgba<u8> {
        let Rgba([r, g, b, a]) = color;
        let alpha = (a as f32 * self.style.opacity).round().clamp(0.0, 255.0) as u8;
        Rgba([r, g, b, alpha])
    }
}

fn glyph_for(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Placement of a single line of text on the canvas.
struct TextLayout {
    canvas: Dimensions,
    font_size: u32,
    left: f32,
    top: f32,
    width: f32,
}

impl TextLayout {
    /// Centre `chars` square glyph cells on the canvas midpoint.
    fn centered(canvas: Dimensions, font_size: u32, chars: usize) -> Self {
        let width = (font_size as usize * chars) as f32;
        Self {
            canvas,
            font_size,
            left: canvas.width as f32 / 2.0 - width / 2.0,
            top: canvas.height as f32 / 2.0 - font_size as f32 / 2.0,
            width,
        }
    }

    /// Render glyph coverage into a mask over the text box, clipped to the canvas.
    fn rasterize(&self, glyphs: &[[u8; 8]]) -> Result<Mask, PipelineError> {
        let pad = stroke_width(self.font_size).div_ceil(2) as i64;
        let clamp_x = |v: i64| v.clamp(0, self.canvas.width as i64) as u32;
        let clamp_y = |v: i64| v.clamp(0, self.canvas.height as i64) as u32;

        let x0 = clamp_x(self.left.floor() as i64 - pad);
        let x1 = clamp_x((self.left + self.width).ceil() as i64 + pad);
        let y0 = clamp_y(self.top.floor() as i64 - pad);
        let y1 = clamp_y((self.top + self.font_size as f32).ceil() as i64 + pad);

        let mut mask = Mask::new(x0, y0, x1 - x0, y1 - y0)?;
        let cell = self.font_size as f32;
        let unit = cell / GLYPH_CELLS;

        for y in y0..y1 {
            let v = y as f32 + 0.5 - self.top;
            if v < 0.0 || v >= cell {
                continue;
            }
            let row = ((v / unit) as usize).min(7);
            for x in x0..x1 {
                let u = x as f32 + 0.5 - self.left;
                if u < 0.0 || u >= self.width {
                    continue;
                }
                let index = ((u / cell) as usize).min(glyphs.len() - 1);
                let col = (((u - index as f32 * cell) / unit) as usize).min(7);
                if glyphs[index][row] & (1 << col) != 0 {
                    mask.set(x, y);
                }
            }
        }

        Ok(mask)
    }
}

/// Coverage bitmap over a rectangle of the canvas.
struct Mask {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    fn new(x0: u32, y0: u32, width: u32, height: u32) -> Result<Self, PipelineError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| PipelineError::Render {
                message: format!("watermark surface {}x{} overflows", width, height),
            })?;
        let mut bits = Vec::new();
        bits.try_reserve_exact(len)
            .map_err(|e| PipelineError::Render {
                message: format!("cannot allocate watermark surface: {}", e),
            })?;
        bits.resize(len, false);
        Ok(Self {
            x0,
            y0,
            width,
            height,
            bits,
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y - self.y0) as usize * self.width as usize + (x - self.x0) as usize
    }

    fn set(&mut self, x: u32, y: u32) {
        let i = self.index(x, y);
        self.bits[i] = true;
    }

    fn covered(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.bits.iter().enumerate().filter(|(_, b)| **b).map(|(i, _)| {
            let x = self.x0 + (i % self.width as usize) as u32;
            let y = self.y0 + (i / self.width as usize) as u32;
            (x, y)
        })
    }

    /// Grow coverage by a disc of `radius` pixels.
    fn dilate(&self, radius: u32) -> Result<Mask, PipelineError> {
        let mut grown = Mask::new(self.x0, self.y0, self.width, self.height)?;
        let r = radius as i64;
        let (min_x, min_y) = (self.x0 as i64, self.y0 as i64);
        let (max_x, max_y) = (min_x + self.width as i64, min_y + self.height as i64);

        for (x, y) in self.covered() {
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy > r * r {
                        continue;
                    }
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if nx >= min_x && nx < max_x && ny >= min_y && ny < max_y {
                        grown.set(nx as u32, ny as u32);
                    }
                }
            }
        }

        Ok(grown)
    }

    fn paint(&self, canvas: &mut RgbaImage, color: Rgba<u8>) {
        if color.0[3] == 0 {
            return;
        }
        for (x, y) in self.covered() {
            canvas.get_pixel_mut(x, y).blend(&color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([128, 128, 128, 255]),
        ))
    }

    #[test]
    fn test_font_size_scenario() {
        assert_eq!(font_size(Dimensions::new(1600, 1067), 0.06), 64);
    }

    #[test]
    fn test_font_size_floor() {
        assert_eq!(font_size(Dimensions::new(50, 50), 0.06), MIN_FONT_SIZE);
        assert_eq!(font_size(Dimensions::new(1, 4000), 0.06), MIN_FONT_SIZE);
    }

    #[test]
    fn test_font_size_monotonic() {
        let mut previous = 0;
        for edge in (1..4000).step_by(7) {
            let size = font_size(Dimensions::new(edge, edge + 10), 0.06);
            assert!(size >= previous, "edge {edge}: {size} < {previous}");
            previous = size;
        }
    }

    #[test]
    fn test_stroke_width() {
        assert_eq!(stroke_width(64), 8);
        assert_eq!(stroke_width(12), 1);
        assert_eq!(stroke_width(4), 1);
    }

    #[test]
    fn test_style_from_default_config() {
        let style = WatermarkStyle::from_config(&WatermarkConfig::default()).unwrap();
        assert_eq!(style.fill_color, Rgba([255, 255, 255, 191]));
        assert_eq!(style.stroke_color, Rgba([0, 0, 0, 115]));
        assert_eq!(style.text, "Placement Demo");
    }

    #[test]
    fn test_apply_marks_centre_and_keeps_corners() {
        let watermarker = Watermarker::new(WatermarkStyle::default());
        let out = watermarker.apply(grey(800, 600)).unwrap();

        assert_eq!(out.dimensions(), (800, 600));
        assert_eq!(*out.get_pixel(0, 0), Rgba([128, 128, 128, 255]));
        assert_eq!(*out.get_pixel(799, 599), Rgba([128, 128, 128, 255]));

        let band_changed = (0..800)
            .flat_map(|x| (280..320).map(move |y| (x, y)))
            .any(|(x, y)| *out.get_pixel(x, y) != Rgba([128, 128, 128, 255]));
        assert!(band_changed);
    }

    #[test]
    fn test_fill_lightens_and_stroke_darkens() {
        let watermarker = Watermarker::new(WatermarkStyle::default());
        let out = watermarker.apply(grey(800, 600)).unwrap();

        let lighter = out.pixels().any(|p| p.0[0] > 128);
        let darker = out.pixels().any(|p| p.0[0] < 128);
        assert!(lighter, "fill pass missing");
        assert!(darker, "stroke pass missing");
    }

    #[test]
    fn test_zero_opacity_leaves_image_untouched() {
        let style = WatermarkStyle {
            opacity: 0.0,
            ..WatermarkStyle::default()
        };
        let out = Watermarker::new(style).apply(grey(200, 100)).unwrap();
        assert!(out.pixels().all(|p| *p == Rgba([128, 128, 128, 255])));
    }

    #[test]
    fn test_empty_text_is_noop() {
        let style = WatermarkStyle {
            text: String::new(),
            ..WatermarkStyle::default()
        };
        let out = Watermarker::new(style).apply(grey(64, 64)).unwrap();
        assert!(out.pixels().all(|p| *p == Rgba([128, 128, 128, 255])));
    }

    #[test]
    fn test_text_wider_than_image_is_clipped() {
        let style = WatermarkStyle {
            text: "A very long watermark that cannot fit".to_string(),
            ..WatermarkStyle::default()
        };
        let out = Watermarker::new(style).apply(grey(40, 40)).unwrap();
        assert_eq!(out.dimensions(), (40, 40));
    }

    #[test]
    fn test_text_is_horizontally_centred() {
        let watermarker = Watermarker::new(WatermarkStyle::default());
        let out = watermarker.apply(grey(1000, 400)).unwrap();

        let touched: Vec<u32> = (0..1000)
            .filter(|&x| (0..400).any(|y| *out.get_pixel(x, y) != Rgba([128, 128, 128, 255])))
            .collect();
        let first = *touched.first().unwrap() as i64;
        let last = *touched.last().unwrap() as i64;
        let left_margin = first;
        let right_margin = 999 - last;
        // Glyph side bearings differ by at most one cell unit plus the stroke
        assert!((left_margin - right_margin).abs() <= 12, "{left_margin} vs {right_margin}");
    }
}
