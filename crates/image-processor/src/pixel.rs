//! RGB pixel storage and the strided view the dithering engine works on.

use std::path::Path;

use sticker_status::{Result, Status};
use tracing::debug;

use crate::dither::{DitherAlgorithm, dither};
use crate::raster::RasterBitmap;

/// Bytes per pixel in the flat buffer.
pub const BYTES_PER_PIXEL: usize = 3;

/// One RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel average, rounded down.
    pub fn luminance(self) -> u8 {
        let sum = u16::from(self.r) + u16::from(self.g) + u16::from(self.b);
        (sum / 3) as u8
    }
}

/// Read/write accessor over a flat, row-major buffer of RGB triplets.
///
/// Height is derived as `len / 3 / width`. A trailing partial row is ignored
/// and never touched.
#[derive(Debug)]
pub struct PixelBuffer<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap `data` as an image `width` pixels wide.
    ///
    /// Fails with `InvalidArgument` when `width` is zero.
    pub fn new(data: &'a mut [u8], width: u32) -> Result<Self> {
        if width == 0 {
            return Err(Status::invalid_argument("pixel buffer width must not be zero"));
        }
        let width = width as usize;
        let height = data.len() / BYTES_PER_PIXEL / width;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Number of addressable pixels (`width * height`).
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Pixel at flat index `index`, or `None` past the last full row.
    pub fn pixel(&self, index: usize) -> Option<Rgb> {
        if index >= self.pixel_count() {
            return None;
        }
        let base = index * BYTES_PER_PIXEL;
        Some(Rgb::new(
            self.data[base],
            self.data[base + 1],
            self.data[base + 2],
        ))
    }

    pub fn pixel_at(&self, x: u32, y: u32) -> Option<Rgb> {
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixel(y * self.width + x)
    }

    /// Add `delta` to every channel of the pixel at `index`, clamping to
    /// `0..=255`. Returns `false` and leaves the buffer alone when `index` is
    /// out of range.
    pub fn add_error(&mut self, index: usize, delta: i32) -> bool {
        if index >= self.pixel_count() {
            return false;
        }
        let base = index * BYTES_PER_PIXEL;
        for channel in &mut self.data[base..base + BYTES_PER_PIXEL] {
            *channel = (i32::from(*channel) + delta).clamp(0, 255) as u8;
        }
        true
    }
}

/// An owned RGB frame: the pixels of one normalized image plus its width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    data: Vec<u8>,
    width: u32,
}

impl RgbFrame {
    pub fn new(data: Vec<u8>, width: u32) -> Self {
        Self { data, width }
    }

    /// Load a headerless `.rgb` dump. The width cannot be recovered from the
    /// file, so the caller supplies it.
    pub fn from_rgb_file(path: &Path, width: u32) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            Status::from(e).context(format!("Failed to read {}", path.display()))
        })?;
        debug!(path = %path.display(), bytes = data.len(), width, "Loaded raw RGB file");
        Ok(Self::new(data, width))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Full rows available, or 0 for a zero width.
    pub fn height(&self) -> u32 {
        if self.width == 0 {
            return 0;
        }
        (self.data.len() / BYTES_PER_PIXEL / self.width as usize) as u32
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixel view over this frame.
    pub fn pixels(&mut self) -> Result<PixelBuffer<'_>> {
        PixelBuffer::new(&mut self.data, self.width)
    }

    /// Dither the frame into a printable raster, consuming it.
    pub fn dither(mut self, algorithm: DitherAlgorithm) -> Result<RasterBitmap> {
        let pixels = self.pixels()?;
        Ok(dither(pixels, algorithm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sticker_status::StatusCode;

    #[test]
    fn test_luminance_rounds_down() {
        assert_eq!(Rgb::new(0, 0, 0).luminance(), 0);
        assert_eq!(Rgb::new(255, 255, 255).luminance(), 255);
        assert_eq!(Rgb::new(1, 1, 0).luminance(), 0);
        assert_eq!(Rgb::new(100, 101, 102).luminance(), 101);
        assert_eq!(Rgb::new(255, 255, 0).luminance(), 170);
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let mut data = vec![0u8; 12];
        let err = PixelBuffer::new(&mut data, 0).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidArgument);
    }

    #[test]
    fn test_height_drops_partial_row() {
        // 2 pixels wide, 2 full rows and one extra pixel plus a stray byte.
        let mut data = vec![0u8; 2 * 2 * 3 + 3 + 1];
        let buf = PixelBuffer::new(&mut data, 2).unwrap();
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.pixel_count(), 4);
        assert!(buf.pixel(3).is_some());
        assert!(buf.pixel(4).is_none());
    }

    #[test]
    fn test_pixel_accessors() {
        let mut data = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let buf = PixelBuffer::new(&mut data, 2).unwrap();
        assert_eq!(buf.pixel(0), Some(Rgb::new(1, 2, 3)));
        assert_eq!(buf.pixel_at(1, 1), Some(Rgb::new(10, 11, 12)));
        assert_eq!(buf.pixel_at(2, 0), None);
        assert_eq!(buf.pixel_at(0, 2), None);
    }

    #[test]
    fn test_add_error_clamps_each_channel() {
        let mut data = vec![250, 10, 128];
        let mut buf = PixelBuffer::new(&mut data, 1).unwrap();
        assert!(buf.add_error(0, 20));
        assert_eq!(buf.pixel(0), Some(Rgb::new(255, 30, 148)));
        assert!(buf.add_error(0, -40));
        assert_eq!(buf.pixel(0), Some(Rgb::new(215, 0, 108)));
    }

    #[test]
    fn test_add_error_out_of_range_is_ignored() {
        let mut data = vec![5u8; 6];
        let mut buf = PixelBuffer::new(&mut data, 2).unwrap();
        assert!(!buf.add_error(2, 100));
        assert_eq!(data, vec![5u8; 6]);
    }

    #[test]
    fn test_frame_from_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = RgbFrame::from_rgb_file(&dir.path().join("image.rgb"), 576).unwrap_err();
        assert_eq!(err.code(), StatusCode::NotFound);
    }

    #[test]
    fn test_frame_from_rgb_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.rgb");
        std::fs::write(&path, vec![0u8; 16 * 3 * 2]).unwrap();

        let frame = RgbFrame::from_rgb_file(&path, 16).unwrap();
        assert_eq!(frame.width(), 16);
        assert_eq!(frame.height(), 2);
    }
}
