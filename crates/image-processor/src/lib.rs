//! Image pipeline for the sticker printer.
//!
//! Decodes and normalizes sticker images, then dithers them with error
//! diffusion into the packed 1-bit raster the printer consumes.

pub mod dither;
pub mod normalize;
pub mod pixel;
pub mod raster;
pub mod resize;
pub mod rotate;

pub use dither::{DitherAlgorithm, dither};
pub use normalize::{ImageNormalizer, StickerNormalizer};
pub use pixel::{PixelBuffer, Rgb, RgbFrame};
pub use raster::RasterBitmap;

/// Print head width of the M02 Pro in dots.
pub const PRINT_WIDTH: u32 = 576;
