//! Printer-ready 1-bit raster images.

/// A 1-bit-per-pixel bitmap, packed row-major with the MSB as the leftmost
/// dot of each byte. Rows are padded to whole bytes.
///
/// Produced by the image preprocessor and the QR rasterizer; consumed (and
/// dropped) by the command encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Wrap already-packed raster data.
    pub fn new(width: u16, height: u16, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            data.len(),
            width.div_ceil(8) as usize * height as usize,
            "packed raster length does not match {}x{}",
            width,
            height
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// Bytes per packed row.
    #[inline]
    pub fn width_bytes(&self) -> usize {
        self.width.div_ceil(8) as usize
    }

    /// Whether the dot at (x, y) prints black. Out-of-range is white.
    pub fn is_black(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * self.width_bytes() + x as usize / 8;
        self.data[idx] & (0x80 >> (x % 8)) != 0
    }

    /// Number of black dots.
    pub fn ink(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }
}
