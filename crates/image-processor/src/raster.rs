//! Packed 1-bit raster bitmaps.
//!
//! 8 dots per byte, most significant bit first, rows of `width / 8` bytes.
//! A set bit prints a dot.

/// The printer firmware treats this bitmap byte as a line feed.
pub const LINE_FEED_BYTE: u8 = 0x0a;

/// Stand-in for [`LINE_FEED_BYTE`]: `0b0001_0100` instead of `0b0000_1010`,
/// the same two dots shifted left by one.
pub const LINE_FEED_SUBSTITUTE: u8 = 0x14;

/// Monochrome raster ready for the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBitmap {
    data: Vec<u8>,
    width_pixels: u32,
}

impl RasterBitmap {
    /// Wrap already packed raster bytes.
    pub fn from_bytes(data: Vec<u8>, width_pixels: u32) -> Self {
        Self { data, width_pixels }
    }

    pub fn width_pixels(&self) -> u32 {
        self.width_pixels
    }

    pub fn bytes_per_row(&self) -> usize {
        (self.width_pixels / 8) as usize
    }

    /// Number of complete rows in the bitmap.
    pub fn rows(&self) -> usize {
        match self.bytes_per_row() {
            0 => 0,
            bpr => self.data.len() / bpr,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl AsRef<[u8]> for RasterBitmap {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Packs dots into bytes in scan order and applies the line feed fix-up as
/// each byte completes. Dots past the preallocated length are dropped.
#[derive(Debug)]
pub(crate) struct RasterWriter {
    data: Vec<u8>,
    offset: usize,
    shift: u8,
}

impl RasterWriter {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            data: vec![0; len],
            offset: 0,
            shift: 7,
        }
    }

    pub(crate) fn push(&mut self, dot: bool) {
        let Some(byte) = self.data.get_mut(self.offset) else {
            return;
        };
        if dot {
            *byte |= 1 << self.shift;
        }
        if self.shift == 0 {
            if *byte == LINE_FEED_BYTE {
                *byte = LINE_FEED_SUBSTITUTE;
            }
            self.shift = 7;
            self.offset += 1;
        } else {
            self.shift -= 1;
        }
    }

    pub(crate) fn finish(self, width_pixels: u32) -> RasterBitmap {
        RasterBitmap::from_bytes(self.data, width_pixels)
    }
}
