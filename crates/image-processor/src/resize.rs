//! Aspect-preserving scale to the print head width.

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::debug;

/// Resize an image to `width` pixels, keeping its aspect ratio.
///
/// Uses Lanczos3 filtering. The height is rounded and never drops below 1.
pub fn resize_to_width(img: DynamicImage, width: u32) -> DynamicImage {
    let (orig_w, orig_h) = (img.width(), img.height());

    if orig_w == width {
        return img;
    }

    let ratio = f64::from(width) / f64::from(orig_w);
    let new_height = ((f64::from(orig_h) * ratio).round() as u32).max(1);

    debug!(
        orig_w,
        orig_h,
        new_width = width,
        new_height,
        "Resizing sticker to head width"
    );

    img.resize_exact(width, new_height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([128])))
    }

    #[test]
    fn test_downscale_to_head_width() {
        let result = resize_to_width(create_test_image(1152, 2000), crate::PRINT_WIDTH);
        assert_eq!(result.width(), 576);
        assert_eq!(result.height(), 1000);
    }

    #[test]
    fn test_upscale() {
        let result = resize_to_width(create_test_image(288, 100), 576);
        assert_eq!(result.width(), 576);
        assert_eq!(result.height(), 200);
    }

    #[test]
    fn test_same_width_is_untouched() {
        let result = resize_to_width(create_test_image(576, 777), 576);
        assert_eq!((result.width(), result.height()), (576, 777));
    }

    #[test]
    fn test_height_never_zero() {
        let result = resize_to_width(create_test_image(5000, 1), 576);
        assert_eq!(result.width(), 576);
        assert!(result.height() >= 1);
    }
}
