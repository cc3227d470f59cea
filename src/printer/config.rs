//! # Printer Configuration
//!
//! This module defines hardware specifications for the supported thermal printer.
//!
//! ## Supported Printers
//!
//! | Model | Width (dots) | Resolution | Link |
//! |-------|--------------|------------|------|
//! | Generic 80mm ESC/POS | 590 | 203 DPI | USB CDC serial, 9600 baud |
//!
//! ## Usage
//!
//! ```
//! use inkslip::printer::PrinterConfig;
//!
//! let config = PrinterConfig::RECEIPT_80MM;
//! println!("Print width: {} dots ({} bytes)",
//!          config.width_dots,
//!          config.width_bytes());
//! ```

use crate::protocol::text::Font;

/// # Printer Configuration
///
/// Defines the hardware characteristics of a thermal printer.
///
/// ## Physical Properties
///
/// - **width_dots**: Maximum printable width in dots (pixels). No raster
///   image may be wider than this.
/// - **dpi**: Resolution in dots per inch
/// - **columns_font_a / columns_font_b**: Characters per line at 1x scale
///
/// ## Serial Link
///
/// - **baud_rate**: Fixed line speed used when the port is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    /// Maximum print width in dots (pixels)
    pub width_dots: u16,

    /// Resolution in dots per inch
    pub dpi: u16,

    /// Line speed of the serial link
    pub baud_rate: u32,

    /// Characters per line in font A (12x24)
    pub columns_font_a: u16,

    /// Characters per line in font B (9x17)
    pub columns_font_b: u16,
}

impl PrinterConfig {
    /// # Generic 80mm ESC/POS Receipt Printer
    ///
    /// The configuration observed on the lab printer: 590 printable dots,
    /// attached through a USB CDC-ACM serial port at 9600 baud, Korean
    /// firmware (EUC-KR double-byte text).
    pub const RECEIPT_80MM: Self = Self {
        name: "80mm ESC/POS",
        width_dots: 590,
        dpi: 203,
        baud_rate: 9600,
        columns_font_a: 48,
        columns_font_b: 64,
    };

    /// Width in bytes of one packed raster row spanning the full head.
    #[inline]
    pub fn width_bytes(&self) -> u16 {
        self.width_dots.div_ceil(8)
    }

    /// Characters per line for a font at 1x horizontal scale.
    #[inline]
    pub fn columns(&self, font: Font) -> u16 {
        match font {
            Font::A => self.columns_font_a,
            Font::B => self.columns_font_b,
        }
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::RECEIPT_80MM
    }
}

// ============================================================================
// TESTS
// ============================================================================
