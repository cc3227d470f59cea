//! # ESC/POS Protocol Commands
//!
//! This module implements the basic ESC/POS printer-control commands used by
//! generic 80mm thermal receipt printers (Epson TM-series compatibles and the
//! many Korean/Chinese clones that speak the same dialect).
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `LF`
//! - Two bytes: `ESC @`, `FS &`
//! - Multi-byte with parameters: `GS V m n`
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for graphics, character size and the cutter.
pub const GS: u8 = 0x1D;

/// FS (File Separator) - Double-byte (Kanji/Hangul) command prefix
pub const FS: u8 = 0x1C;

/// LF (Line Feed) - Print the line buffer and advance one line
///
/// Advances by the current line spacing (ESC 3 n, or the default set by ESC 2).
pub const LF: u8 = 0x0A;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets every mode to its power-on default:
/// left alignment, font A, bold off, 1x1 character size, default line
/// spacing. Sent at the start of every job so the encoder's attribute state
/// and the device agree.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ## Example
///
/// ```
/// use inkslip::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Select Double-Byte Character Mode (FS &)
///
/// Switches the printer to its double-byte character set. On Korean firmware
/// this is KS X 1001, i.e. text must be sent EUC-KR encoded.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | FS &  |
/// | Hex     | 1C 26 |
#[inline]
pub fn korean_mode() -> Vec<u8> {
    vec![FS, b'&']
}

// ============================================================================
// PAPER FEED
// ============================================================================

/// # Line Feed (LF)
#[inline]
pub fn line_feed() -> Vec<u8> {
    vec![LF]
}

// ============================================================================
// CUTTER CONTROL
// ============================================================================

/// # Feed and Full Cut (GS V 65 n)
///
/// Feeds paper to the cutting position plus `n` motion units, then performs
/// a full cut. This is the terminal instruction of every receipt.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS V A n |
/// | Hex     | 1D 56 41 n |
///
/// ## Example
///
/// ```
/// use inkslip::protocol::commands;
///
/// assert_eq!(commands::cut(3), vec![0x1D, 0x56, 0x41, 0x03]);
/// ```
#[inline]
pub fn cut(feed: u8) -> Vec<u8> {
    vec![GS, b'V', 65, feed]
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ## Example
///
/// ```
/// use inkslip::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(590), [0x4E, 0x02]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_korean_mode() {
        assert_eq!(korean_mode(), vec![0x1C, 0x26]);
    }

    #[test]
    fn test_feed() {
        assert_eq!(line_feed(), vec![0x0A]);
    }

    #[test]
    fn test_cut() {
        assert_eq!(cut(0), vec![0x1D, 0x56, 0x41, 0x00]);
        assert_eq!(cut(3), vec![0x1D, 0x56, 0x41, 0x03]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x00FF), [0xFF, 0x00]);
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
        assert_eq!(u16_le(74), [0x4A, 0x00]); // 590 dots = 74 bytes per row
    }
}
