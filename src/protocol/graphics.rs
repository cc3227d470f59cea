//! # ESC/POS Graphics Commands
//!
//! This module implements the two image-transfer commands used for receipts.
//!
//! ## Graphics Modes Overview
//!
//! | Mode | Command | Layout | Used For |
//! |------|---------|--------|----------|
//! | Bit image | ESC * m nL nH | Column-major bands of 8 or 24 dots | Logos, avatars, photos |
//! | Raster | GS v 0 m | Row-major, arbitrary height | QR codes |
//!
//! ## Bit Packing
//!
//! Source images are handed in as packed rows (the same layout
//! [`crate::render::RasterImage`] uses):
//! - Bit 7 (MSB) = leftmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```
//!
//! Bit-image mode re-slices those rows into vertical columns, where bit 7 is
//! the *top* dot of each byte.

use super::commands::{ESC, GS, LF, u16_le};

// ============================================================================
// BIT IMAGE MODE (ESC *)
// ============================================================================

/// Bit image density (the `m` parameter of ESC *).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Density {
    /// 8-dot single density (half horizontal resolution)
    S8 = 0,
    /// 8-dot double density
    D8 = 1,
    /// 24-dot single density (half horizontal resolution)
    S24 = 32,
    /// 24-dot double density (full resolution)
    #[default]
    D24 = 33,
}

impl Density {
    /// Rows covered by one band.
    pub fn band_height(self) -> usize {
        match self {
            Density::S8 | Density::D8 => 8,
            Density::S24 | Density::D24 => 24,
        }
    }

    /// Bytes sent per column within a band.
    pub fn bytes_per_column(self) -> usize {
        self.band_height() / 8
    }
}

/// # Select Bit-Image Mode (ESC * m nL nH d1...dk)
///
/// Emits the whole image as a sequence of bands, each followed by LF.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC * m nL nH d1...dk |
/// | Hex     | 1B 2A m nL nH d1...dk |
///
/// - `m`: density ([`Density`])
/// - `nL, nH`: number of columns (dots), little-endian
/// - `k = columns × bytes_per_column`
///
/// ## Data Layout
///
/// ```text
/// column 0        column 1        ...
/// ┌──────────┐    ┌──────────┐
/// │ byte 0   │ rows 0-7   (bit 7 = row 0)
/// │ byte 1   │ rows 8-15
/// │ byte 2   │ rows 16-23
/// └──────────┘    └──────────┘
/// ```
///
/// The last band is padded with white rows. The caller is responsible for
/// setting line spacing to zero around the image so bands butt together.
///
/// ## Example
///
/// ```
/// use inkslip::protocol::graphics::{bit_image, Density};
///
/// // 8x24 all-black image: one band, 8 columns of 3 bytes
/// let data = vec![0xFF; 24];
/// let cmd = bit_image(Density::D24, 8, 24, &data);
/// assert_eq!(&cmd[0..5], &[0x1B, 0x2A, 33, 8, 0]);
/// assert_eq!(cmd.len(), 5 + 8 * 3 + 1);
/// ```
pub fn bit_image(density: Density, width: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width.div_ceil(8) as usize;
    let height = height as usize;

    debug_assert!(
        data.len() == width_bytes * height,
        "Bit image data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        width_bytes * height,
        width_bytes,
        height,
        data.len()
    );

    let band_height = density.band_height();
    let bytes_per_column = density.bytes_per_column();
    let bands = height.div_ceil(band_height);
    let [nl, nh] = u16_le(width);

    let mut cmd = Vec::with_capacity(bands * (6 + width as usize * bytes_per_column));

    for band in 0..bands {
        let top = band * band_height;
        cmd.push(ESC);
        cmd.push(b'*');
        cmd.push(density as u8);
        cmd.push(nl);
        cmd.push(nh);

        for x in 0..width as usize {
            let byte_idx = x / 8;
            let mask = 0x80u8 >> (x % 8);
            for k in 0..bytes_per_column {
                let mut column_byte = 0u8;
                for bit in 0..8 {
                    let y = top + k * 8 + bit;
                    if y < height && data[y * width_bytes + byte_idx] & mask != 0 {
                        column_byte |= 0x80 >> bit;
                    }
                }
                cmd.push(column_byte);
            }
        }

        cmd.push(LF);
    }

    cmd
}

// ============================================================================
// RASTER MODE (GS v 0)
// ============================================================================

/// Raster bit image scaling (the `m` parameter of GS v 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterScale {
    #[default]
    Normal = 0,
    DoubleWidth = 1,
    DoubleHeight = 2,
    Quadruple = 3,
}

impl RasterScale {
    /// Horizontal magnification applied by the printer.
    pub fn x_factor(self) -> u16 {
        match self {
            RasterScale::Normal | RasterScale::DoubleHeight => 1,
            RasterScale::DoubleWidth | RasterScale::Quadruple => 2,
        }
    }
}

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1...dk |
/// | Hex     | 1D 76 30 m xL xH yL yH d1...dk |
///
/// - `m`: scaling ([`RasterScale`])
/// - `xL, xH`: width in bytes, little-endian
/// - `yL, yH`: height in dots, little-endian
/// - `k = width_bytes × height`, row-major, MSB = leftmost dot
///
/// ## Example
///
/// ```
/// use inkslip::protocol::graphics::{raster, RasterScale};
///
/// let data = vec![0xAA; 74 * 100];
/// let cmd = raster(RasterScale::Normal, 590, 100, &data);
/// assert_eq!(&cmd[0..8], &[0x1D, 0x76, 0x30, 0, 74, 0, 100, 0]);
/// ```
pub fn raster(scale: RasterScale, width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);
    let expected_len = width_bytes as usize * height as usize;

    debug_assert!(
        data.len() == expected_len,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        expected_len,
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(8 + data.len());
    cmd.push(GS);
    cmd.push(b'v');
    cmd.push(b'0');
    cmd.push(scale as u8);
    cmd.push(xl);
    cmd.push(xh);
    cmd.push(yl);
    cmd.push(yh);
    cmd.extend_from_slice(data);
    cmd
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_bands() {
        assert_eq!(Density::D24.band_height(), 24);
        assert_eq!(Density::D24.bytes_per_column(), 3);
        assert_eq!(Density::S8.band_height(), 8);
        assert_eq!(Density::S8.bytes_per_column(), 1);
    }

    #[test]
    fn test_bit_image_single_band_header() {
        let data = vec![0x00; 2 * 24]; // 16 dots wide, 24 rows
        let cmd = bit_image(Density::D24, 16, 24, &data);

        assert_eq!(&cmd[0..5], &[0x1B, 0x2A, 33, 16, 0]);
        assert_eq!(cmd.len(), 5 + 16 * 3 + 1);
        assert_eq!(*cmd.last().unwrap(), 0x0A);
    }

    #[test]
    fn test_bit_image_column_layout() {
        // 8 dots wide, 24 rows. Only the top-left dot is black.
        let mut data = vec![0x00; 24];
        data[0] = 0x80;
        let cmd = bit_image(Density::D24, 8, 24, &data);

        // Column 0, first byte: top dot set
        assert_eq!(cmd[5], 0x80);
        // Everything else white
        assert!(cmd[6..5 + 24].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bit_image_bottom_dot_of_band() {
        // 8 dots wide, 24 rows. Leftmost dot of row 23 is black.
        let mut data = vec![0x00; 24];
        data[23] = 0x80;
        let cmd = bit_image(Density::D24, 8, 24, &data);

        // Column 0, third byte, bit 0
        assert_eq!(&cmd[5..8], &[0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_bit_image_pads_last_band() {
        // 30 rows need two 24-dot bands
        let data = vec![0xFF; 30];
        let cmd = bit_image(Density::D24, 8, 30, &data);

        let band_len = 5 + 8 * 3 + 1;
        assert_eq!(cmd.len(), band_len * 2);
        // Second band: rows 24..29 black (6 rows), rest white
        let second = &cmd[band_len + 5..band_len + 8];
        assert_eq!(second, &[0xFC, 0x00, 0x00]);
    }

    #[test]
    fn test_bit_image_8_dot() {
        let data = vec![0xFF; 8];
        let cmd = bit_image(Density::D8, 8, 8, &data);
        assert_eq!(&cmd[0..5], &[0x1B, 0x2A, 1, 8, 0]);
        assert_eq!(cmd.len(), 5 + 8 + 1);
        assert!(cmd[5..13].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_raster_header() {
        let data = vec![0xFF; 74 * 100];
        let cmd = raster(RasterScale::Quadruple, 590, 100, &data);

        assert_eq!(cmd[0], 0x1D); // GS
        assert_eq!(cmd[1], 0x76); // 'v'
        assert_eq!(cmd[2], 0x30); // '0'
        assert_eq!(cmd[3], 3); // m = quadruple
        assert_eq!(cmd[4], 74); // xL (590 dots -> 74 bytes)
        assert_eq!(cmd[5], 0); // xH
        assert_eq!(cmd[6], 100); // yL
        assert_eq!(cmd[7], 0); // yH
        assert_eq!(cmd.len(), 8 + 74 * 100);
    }

    #[test]
    fn test_raster_large_height() {
        let height: u16 = 500;
        let data = vec![0x00; 10 * height as usize];
        let cmd = raster(RasterScale::Normal, 80, height, &data);

        // 500 = 0x01F4 -> [0xF4, 0x01]
        assert_eq!(cmd[6], 0xF4);
        assert_eq!(cmd[7], 0x01);
    }

    #[test]
    fn test_raster_scale_factor() {
        assert_eq!(RasterScale::Normal.x_factor(), 1);
        assert_eq!(RasterScale::DoubleWidth.x_factor(), 2);
        assert_eq!(RasterScale::Quadruple.x_factor(), 2);
    }
}
