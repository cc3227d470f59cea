//! # ESC/POS Text Styling Commands
//!
//! This module implements text formatting commands and text encoding for
//! ESC/POS printers with Korean firmware.
//!
//! ## Text Styling Overview
//!
//! | Style | Command | Effect |
//! |-------|---------|--------|
//! | Alignment | ESC a n | Left / center / right |
//! | Font | ESC M n | Font A (12×24) or B (9×17) |
//! | Bold | ESC E n | **Emphasized** text |
//! | Size | GS ! n | 1–8× width and height |
//! | Line spacing | ESC 3 n / ESC 2 | Custom / default feed per line |
//!
//! Every one of these is sticky: it applies until changed again or until
//! the printer is reinitialized with ESC @.
//!
//! ## Text Encoding
//!
//! The printer renders double-byte text in EUC-KR. [`encode`] converts Rust
//! strings, falling back to ASCII look-alikes for typographic characters
//! outside the Korean character set.

use encoding_rs::EUC_KR;

use super::commands::{ESC, GS};

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Set Text Alignment (ESC a n)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC a n |
/// | Hex     | 1B 61 n |
///
/// Takes effect at the start of the next line. Also positions bit images
/// and raster images.
///
/// ## Example
///
/// ```
/// use inkslip::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// FONT SELECTION
// ============================================================================

/// Available fonts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Font {
    /// Font A: 12×24 dots, 48 columns on 80mm paper
    #[default]
    A = 0,
    /// Font B: 9×17 dots, 64 columns on 80mm paper
    B = 1,
}

/// # Select Character Font (ESC M n)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC M n |
/// | Hex     | 1B 4D n |
pub fn font(f: Font) -> Vec<u8> {
    vec![ESC, b'M', f as u8]
}

// ============================================================================
// TEXT EMPHASIS (BOLD)
// ============================================================================

/// # Turn Emphasized Mode On/Off (ESC E n)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC E n |
/// | Hex     | 1B 45 n |
///
/// ## Example
///
/// ```
/// use inkslip::protocol::text::bold;
///
/// assert_eq!(bold(true), vec![0x1B, 0x45, 0x01]);
/// assert_eq!(bold(false), vec![0x1B, 0x45, 0x00]);
/// ```
#[inline]
pub fn bold(enabled: bool) -> Vec<u8> {
    vec![ESC, b'E', enabled as u8]
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// Largest supported magnification on either axis.
pub const MAX_SCALE: u8 = 8;

/// # Select Character Size (GS ! n)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS ! n |
/// | Hex     | 1D 21 n |
///
/// ## Parameters
///
/// The high nibble of `n` is the width multiplier minus one, the low
/// nibble the height multiplier minus one:
///
/// ```text
/// n = ((scale_x - 1) << 4) | (scale_y - 1)
/// ```
///
/// Scales outside 1..=8 are clamped.
///
/// ## Example
///
/// ```
/// use inkslip::protocol::text::size;
///
/// assert_eq!(size(1, 1), vec![0x1D, 0x21, 0x00]);
/// assert_eq!(size(2, 1), vec![0x1D, 0x21, 0x10]); // double width
/// assert_eq!(size(2, 2), vec![0x1D, 0x21, 0x11]);
/// ```
pub fn size(scale_x: u8, scale_y: u8) -> Vec<u8> {
    let w = scale_x.clamp(1, MAX_SCALE) - 1;
    let h = scale_y.clamp(1, MAX_SCALE) - 1;
    vec![GS, b'!', (w << 4) | h]
}

// ============================================================================
// LINE SPACING
// ============================================================================

/// # Set Line Spacing (ESC 3 n)
///
/// Sets the feed amount per line to `n` motion units (1/180 inch on most
/// 203 DPI mechanisms).
#[inline]
pub fn line_spacing(n: u8) -> Vec<u8> {
    vec![ESC, b'3', n]
}

/// # Select Default Line Spacing (ESC 2)
#[inline]
pub fn line_spacing_default() -> Vec<u8> {
    vec![ESC, b'2']
}

// ============================================================================
// TEXT ENCODING
// ============================================================================

/// Encode text for the printer's double-byte character set.
///
/// Newlines pass through as LF; every other control byte (C0 and DEL) is
/// dropped so text can never smuggle in a command. Characters EUC-KR cannot
/// represent are replaced by an ASCII look-alike when one exists, otherwise
/// by `?`.
///
/// ## Example
///
/// ```
/// use inkslip::protocol::text::encode;
///
/// assert_eq!(encode("abc"), b"abc".to_vec());
/// assert_eq!(encode("한"), vec![0xC7, 0xD1]);
/// ```
pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];

    for ch in text.chars() {
        if ch.is_ascii() {
            if ch == '\n' || !ch.is_ascii_control() {
                out.push(ch as u8);
            }
            continue;
        }

        let (bytes, _, unmappable) = EUC_KR.encode(ch.encode_utf8(&mut buf));
        if !unmappable {
            out.extend_from_slice(&bytes);
        } else if let Some(fallback) = ascii_fallback(ch) {
            out.extend_from_slice(fallback.as_bytes());
        } else {
            out.push(b'?');
        }
    }

    out
}

/// ASCII stand-ins for punctuation that commonly shows up in issue titles.
fn ascii_fallback(ch: char) -> Option<&'static str> {
    match ch {
        '›' | '»' => Some(">"),
        '‹' | '«' => Some("<"),
        '…' => Some("..."),
        '‘' | '’' | '′' => Some("'"),
        '“' | '”' | '″' => Some("\""),
        '–' | '—' | '‐' => Some("-"),
        '\u{00A0}' | '\u{2009}' | '\u{202F}' => Some(" "),
        '•' => Some("*"),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
