//! Orientation fix-up: stickers print along the paper, so landscape sources
//! are turned upright before they are scaled to the head width.

use image::DynamicImage;
use tracing::debug;

/// Rotate a landscape image 90 degrees clockwise.
///
/// Portrait and square images are returned unchanged.
pub fn auto_rotate_portrait(img: DynamicImage) -> DynamicImage {
    let (w, h) = (img.width(), img.height());

    if w > h {
        debug!(w, h, "Landscape sticker, rotating to portrait");
        img.rotate90()
    } else {
        img
    }
}
