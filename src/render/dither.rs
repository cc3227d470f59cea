//! # Two-Level Quantization
//!
//! This module converts continuous-tone (grayscale) intensities to binary
//! (black/white) dots suitable for a thermal head.
//!
//! Two algorithms are available:
//!
//! | Algorithm | Output | Best For |
//! |-----------|--------|----------|
//! | Threshold | Hard 50% cut | Screenshots, text, line art (default) |
//! | Bayer | 8x8 ordered halftone | Photos (opt-in for uploads) |
//!
//! Both are deterministic and position-only: no error accumulates between
//! pixels, so the same input always yields the same raster.
//!
//! ## The Bayer Matrix
//!
//! ```text
//!     0   1   2   3   4   5   6   7   (x mod 8)
//!   ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! 0 │ 0 │32 │ 8 │40 │ 2 │34 │10 │42 │
//! 1 │48 │16 │56 │24 │50 │18 │58 │26 │
//! 2 │12 │44 │ 4 │36 │14 │46 │ 6 │38 │
//! 3 │60 │28 │52 │20 │62 │30 │54 │22 │
//! 4 │ 3 │35 │11 │43 │ 1 │33 │ 9 │41 │
//! 5 │51 │19 │59 │27 │49 │17 │57 │25 │
//! 6 │15 │47 │ 7 │39 │13 │45 │ 5 │37 │
//! 7 │63 │31 │55 │23 │61 │29 │53 │21 │
//!   └───┴───┴───┴───┴───┴───┴───┴───┘
//! (y mod 8)
//! ```
//!
//! Values are normalized to (0, 1) with `threshold = (value + 0.5) / 64.0`.
//!
//! ## Usage Example
//!
//! ```
//! use inkslip::render::dither::{self, DitheringAlgorithm};
//!
//! // 50% gray at (10, 20)
//! let should_print = dither::should_print(10, 20, 0.5, DitheringAlgorithm::Bayer);
//!
//! // Pack a row of boolean values into bytes
//! let row: Vec<bool> = vec![true, true, false, false, true, false, true, false];
//! let packed = dither::pack_row(&row);
//! assert_eq!(packed, vec![0b11001010]); // 0xCA
//! ```

/// Bayer 8x8 dithering matrix
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Cut-off used by [`DitheringAlgorithm::Threshold`].
pub const MIDPOINT: f32 = 0.5;

/// How intensities are reduced to two levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitheringAlgorithm {
    /// Fixed 50% threshold.
    #[default]
    Threshold,
    /// Bayer 8x8 ordered dithering.
    Bayer,
}

/// Get the Bayer threshold for a pixel position.
///
/// Returns a value in (0.0078125, 0.9921875), never exactly 0 or 1, so pure
/// black always prints and pure white never does.
#[inline]
pub fn bayer_threshold(x: usize, y: usize) -> f32 {
    let matrix_value = BAYER8[y & 7][x & 7];
    (matrix_value as f32 + 0.5) / 64.0
}

/// Determine if a dot should be printed at the given position.
///
/// `intensity` is 0.0 for white and 1.0 for black.
///
/// ## Example
///
/// ```
/// use inkslip::render::dither::{should_print, DitheringAlgorithm};
///
/// assert!(should_print(0, 0, 1.0, DitheringAlgorithm::Threshold));
/// assert!(!should_print(0, 0, 0.0, DitheringAlgorithm::Bayer));
/// ```
#[inline]
pub fn should_print(x: usize, y: usize, intensity: f32, algorithm: DitheringAlgorithm) -> bool {
    match algorithm {
        DitheringAlgorithm::Threshold => intensity > MIDPOINT,
        DitheringAlgorithm::Bayer => intensity > bayer_threshold(x, y),
    }
}

/// Pack a row of boolean pixel values into bytes.
///
/// - Bit 7 (MSB) = leftmost pixel
/// - 1 = black (print dot), 0 = white (no dot)
///
/// Rows whose length is not a multiple of 8 are padded with white on the
/// right.
///
/// ## Example
///
/// ```
/// use inkslip::render::dither::pack_row;
///
/// let row = vec![true; 12];
/// assert_eq!(pack_row(&row), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let num_bytes = pixels.len().div_ceil(8);
    let mut bytes = vec![0u8; num_bytes];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }

    bytes
}

/// Generate a packed two-level raster from an intensity function.
///
/// `intensity_fn(x, y)` returns 0.0 (white) to 1.0 (black). The result is
/// `ceil(width/8) * height` bytes.
///
/// ## Example
///
/// ```
/// use inkslip::render::dither::{generate_raster, DitheringAlgorithm};
///
/// let data = generate_raster(64, 100, |x, _y| x as f32 / 64.0, DitheringAlgorithm::Bayer);
/// assert_eq!(data.len(), 8 * 100);
/// ```
pub fn generate_raster<F>(
    width: usize,
    height: usize,
    intensity_fn: F,
    algorithm: DitheringAlgorithm,
) -> Vec<u8>
where
    F: Fn(usize, usize) -> f32,
{
    let width_bytes = width.div_ceil(8);
    let mut data = Vec::with_capacity(width_bytes * height);
    let mut row_pixels = Vec::with_capacity(width);

    for y in 0..height {
        row_pixels.clear();
        for x in 0..width {
            row_pixels.push(should_print(x, y, intensity_fn(x, y), algorithm));
        }
        data.extend(pack_row(&row_pixels));
    }

    data
}

// ============================================================================
// TESTS
// ============================================================================
