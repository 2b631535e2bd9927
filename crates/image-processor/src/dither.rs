//! Error-diffusion dithering into a packed raster.
//!
//! The input frame is expected to be tone-inverted already, so a bright
//! pixel (luminance above [`THRESHOLD`]) becomes a printed dot.
//!
//! Quantization error is pushed forward into pixels that have not been
//! visited yet, in place, while the scan is still running. Scan order is
//! therefore part of the result: row-major, left to right, top to bottom.

use std::fmt;
use std::str::FromStr;

use sticker_status::Status;
use tracing::debug;

use crate::pixel::PixelBuffer;
use crate::raster::{RasterBitmap, RasterWriter};

/// Luminance strictly above this prints a dot.
pub const THRESHOLD: u8 = 0x80;

/// An error diffusion kernel.
///
/// Each neighbor at `(dx, dy)` from the current pixel receives
/// `error * weight / divisor`, truncated toward zero.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    pub entries: &'static [(isize, usize, i32)],
    pub divisor: i32,
}

/// Floyd-Steinberg kernel, 16/16 of the error.
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // bottom-left
        (0, 1, 5),  // bottom
        (1, 1, 1),  // bottom-right
    ],
    divisor: 16,
};

/// Atkinson kernel, 6/8 of the error. The remaining 2/8 is dropped, which
/// keeps local contrast high.
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
pub const ATKINSON: Kernel = Kernel {
    entries: &[
        (1, 0, 1),  // right
        (2, 0, 1),  // two right
        (-1, 1, 1), // bottom-left
        (0, 1, 1),  // bottom
        (1, 1, 1),  // bottom-right
        (0, 2, 1),  // two below
    ],
    divisor: 8,
};

/// Selectable diffusion kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherAlgorithm {
    FloydSteinberg,
    #[default]
    Atkinson,
}

impl DitherAlgorithm {
    pub fn kernel(self) -> &'static Kernel {
        match self {
            Self::FloydSteinberg => &FLOYD_STEINBERG,
            Self::Atkinson => &ATKINSON,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FloydSteinberg => "floyd-steinberg",
            Self::Atkinson => "atkinson",
        }
    }
}

impl fmt::Display for DitherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DitherAlgorithm {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atkinson" => Ok(Self::Atkinson),
            "floyd-steinberg" | "floyd_steinberg" | "floydsteinberg" | "fs" => {
                Ok(Self::FloydSteinberg)
            }
            other => Err(Status::invalid_argument(format!(
                "unknown dither algorithm '{other}' (expected 'atkinson' or 'floyd-steinberg')"
            ))),
        }
    }
}

/// Quantize a luminance to `0xff` (dot) or `0x00` (no dot).
fn quantize(luminance: i32) -> i32 {
    if luminance > i32::from(THRESHOLD) {
        0xff
    } else {
        0x00
    }
}

/// Dither `pixels` in place and pack the result.
///
/// The output is `width * height / 8` bytes long.
pub fn dither(mut pixels: PixelBuffer<'_>, algorithm: DitherAlgorithm) -> RasterBitmap {
    let width = pixels.width() as usize;
    let height = pixels.height() as usize;
    let total = pixels.pixel_count();
    let kernel = algorithm.kernel();
    debug!(width, height, %algorithm, "Dithering raster image");

    let mut out = RasterWriter::new(total / 8);
    for i in 0..total {
        let Some(pixel) = pixels.pixel(i) else {
            break;
        };
        let x = i % width;
        let y = i / width;

        let old_pixel = i32::from(pixel.luminance());
        let new_pixel = quantize(old_pixel);
        out.push(new_pixel == 0xff);

        let err = old_pixel - new_pixel;
        if err == 0 {
            continue;
        }
        for &(dx, dy, weight) in kernel.entries {
            let Some(nx) = x.checked_add_signed(dx).filter(|&nx| nx < width) else {
                continue;
            };
            let ny = y + dy;
            if ny >= height {
                continue;
            }
            pixels.add_error(ny * width + nx, err * weight / kernel.divisor);
        }
    }

    debug!(bytes = total / 8, "Dithering complete");
    out.finish(width as u32)
}
