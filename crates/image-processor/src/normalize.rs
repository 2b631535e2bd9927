//! Decode arbitrary sticker files into the frame format the dithering engine
//! expects: single frame, head width, grayscale, tone-inverted RGB8.

use std::path::Path;

use image::{DynamicImage, ImageReader, Rgb, RgbImage, RgbaImage};
use sticker_status::{Result, Status};
use tracing::debug;

use crate::pixel::RgbFrame;
use crate::resize::resize_to_width;
use crate::rotate::auto_rotate_portrait;

/// Turns a source image on disk into a print-ready [`RgbFrame`].
pub trait ImageNormalizer: Send + Sync {
    fn normalize(&self, path: &Path) -> Result<RgbFrame>;
}

/// Normalizer backed by the `image` crate decoders.
#[derive(Debug, Clone, Copy)]
pub struct StickerNormalizer {
    width: u32,
}

impl StickerNormalizer {
    pub fn new(width: u32) -> Self {
        Self { width }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Run the in-memory part of the pipeline on an already decoded image.
    pub fn normalize_image(&self, img: DynamicImage) -> RgbFrame {
        let img = DynamicImage::ImageRgb8(flatten_on_white(&img.to_rgba8()));
        let img = auto_rotate_portrait(img);
        let mut img = resize_to_width(img, self.width).grayscale();
        img.invert();

        let rgb = img.to_rgb8();
        debug!(width = rgb.width(), height = rgb.height(), "Sticker normalized");
        RgbFrame::new(rgb.into_raw(), self.width)
    }
}

impl Default for StickerNormalizer {
    fn default() -> Self {
        Self::new(crate::PRINT_WIDTH)
    }
}

impl ImageNormalizer for StickerNormalizer {
    fn normalize(&self, path: &Path) -> Result<RgbFrame> {
        let reader = ImageReader::open(path)
            .map_err(|e| Status::from(e).context(format!("Failed to open {}", path.display())))?
            .with_guessed_format()
            .map_err(|e| Status::from(e).context(format!("Failed to read {}", path.display())))?;

        // Animated formats decode to their first frame.
        let img = reader.decode().map_err(|e| {
            Status::internal(e.to_string()).context(format!("Failed to decode {}", path.display()))
        })?;
        debug!(
            path = %path.display(),
            width = img.width(),
            height = img.height(),
            "Decoded sticker"
        );

        Ok(self.normalize_image(img))
    }
}

/// Composite an RGBA image over an opaque white background.
pub fn flatten_on_white(img: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let alpha = u16::from(pixel[3]);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    out
}
