//! # Code Generation
//!
//! Converts block programs to ESC/POS bytes.
//!
//! The printer's text attributes are sticky: once set they apply to every
//! following line until changed, and `ESC @` resets them. The encoder
//! mirrors that in an [`AttributeState`] threaded through the blocks, so a
//! [`StyleChange`] only emits commands for attributes that actually differ.

use super::ops::{Block, Program, StyleChange};
use crate::error::InkslipError;
use crate::printer::PrinterConfig;
use crate::protocol::graphics::{self, RasterScale};
use crate::protocol::text::{self, Alignment, Font, MAX_SCALE};
use crate::protocol::commands;
use crate::render::qr;

/// Extra feed (motion units) before the cutter fires.
const CUT_FEED: u8 = 3;

/// The printer's attribute state as the encoder believes it to be.
///
/// The default is the state right after `ESC @`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeState {
    pub alignment: Alignment,
    pub font: Font,
    pub bold: bool,
    pub scale_x: u8,
    pub scale_y: u8,
    /// 0 = device default spacing.
    pub line_spacing: u8,
}

impl Default for AttributeState {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            font: Font::A,
            bold: false,
            scale_x: 1,
            scale_y: 1,
            line_spacing: 0,
        }
    }
}

impl AttributeState {
    /// Apply `change`, returning the commands needed to get the printer there.
    pub fn apply(&mut self, change: &StyleChange) -> Vec<u8> {
        let mut out = Vec::new();

        if let Some(alignment) = change.alignment.filter(|&a| a != self.alignment) {
            out.extend(text::align(alignment));
            self.alignment = alignment;
        }

        if let Some(font) = change.font.filter(|&f| f != self.font) {
            out.extend(text::font(font));
            self.font = font;
        }

        if let Some(bold) = change.bold.filter(|&b| b != self.bold) {
            out.extend(text::bold(bold));
            self.bold = bold;
        }

        let scale_x = change.scale_x.unwrap_or(self.scale_x).clamp(1, MAX_SCALE);
        let scale_y = change.scale_y.unwrap_or(self.scale_y).clamp(1, MAX_SCALE);
        if (scale_x, scale_y) != (self.scale_x, self.scale_y) {
            out.extend(text::size(scale_x, scale_y));
            self.scale_x = scale_x;
            self.scale_y = scale_y;
        }

        if let Some(spacing) = change.line_spacing.filter(|&s| s != self.line_spacing) {
            out.extend(spacing_command(spacing));
            self.line_spacing = spacing;
        }

        out
    }
}

fn spacing_command(spacing: u8) -> Vec<u8> {
    if spacing == 0 {
        text::line_spacing_default()
    } else {
        text::line_spacing(spacing)
    }
}

impl Block {
    /// Encode one block against the current attribute state.
    pub fn encode(
        &self,
        state: &mut AttributeState,
        config: &PrinterConfig,
    ) -> Result<Vec<u8>, InkslipError> {
        let mut out = Vec::new();

        match self {
            Block::Style(change) => {
                out.extend(state.apply(change));
            }
            Block::Text(s) => {
                out.extend(text::encode(s));
                out.push(commands::LF);
            }
            Block::Image { raster, density } => {
                if raster.width > config.width_dots {
                    return Err(InkslipError::ImageUnavailable(format!(
                        "image is {} dots wide, printer takes {}",
                        raster.width, config.width_dots
                    )));
                }
                // Bands must butt together with no gap.
                out.extend(text::line_spacing(0));
                out.extend(graphics::bit_image(
                    *density,
                    raster.width,
                    raster.height,
                    &raster.data,
                ));
                out.extend(spacing_command(state.line_spacing));
            }
            Block::Qr {
                data,
                size,
                margin,
                scale,
            } => {
                let image = qr::rasterize(data, *size, *margin)?;
                let scale = fit_scale(*scale, image.width, config.width_dots).ok_or_else(|| {
                    InkslipError::ImageUnavailable(format!(
                        "QR code is {} dots wide, printer takes {}",
                        image.width, config.width_dots
                    ))
                })?;
                out.extend(graphics::raster(scale, image.width, image.height, &image.data));
            }
            Block::Rule => {
                let columns = config.columns(state.font) / state.scale_x as u16;
                out.extend(std::iter::repeat_n(b'-', columns as usize));
                out.push(commands::LF);
            }
            Block::Feed => {
                out.extend(commands::line_feed());
            }
            Block::Cut => {
                out.extend(commands::cut(CUT_FEED));
            }
        }

        Ok(out)
    }
}

/// Pick the requested raster scale, or fall back to unscaled if the magnified
/// image would not fit across the head.
fn fit_scale(requested: RasterScale, width: u16, max_width: u16) -> Option<RasterScale> {
    if width as u32 * requested.x_factor() as u32 <= max_width as u32 {
        Some(requested)
    } else if width <= max_width {
        Some(RasterScale::Normal)
    } else {
        None
    }
}

impl Program {
    /// Compile the program to a complete ESC/POS stream.
    ///
    /// The stream starts with `ESC @` and the double-byte mode switch, so the
    /// encoder begins from [`AttributeState::default`].
    pub fn to_bytes(&self, config: &PrinterConfig) -> Result<Vec<u8>, InkslipError> {
        let mut out = Vec::new();
        out.extend(commands::init());
        out.extend(commands::korean_mode());

        let mut state = AttributeState::default();
        for block in &self.blocks {
            out.extend(block.encode(&mut state, config)?);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::graphics::Density;
    use crate::render::RasterImage;
    use pretty_assertions::assert_eq;

    fn config() -> PrinterConfig {
        PrinterConfig::RECEIPT_80MM
    }

    fn encode_one(block: Block, state: &mut AttributeState) -> Vec<u8> {
        block.encode(state, &config()).unwrap()
    }

    #[test]
    fn test_stream_prefix() {
        let bytes = Program::new().to_bytes(&config()).unwrap();
        assert_eq!(bytes, vec![0x1B, 0x40, 0x1C, 0x26]);
    }

    #[test]
    fn test_style_change_emits_only_differences() {
        let mut state = AttributeState::default();

        let bytes = encode_one(Block::Style(StyleChange::headline()), &mut state);
        assert_eq!(
            bytes,
            vec![
                0x1B, b'a', 1, // center
                0x1B, b'E', 1, // bold
                0x1D, b'!', 0x10, // double width
            ]
        );

        // Same change again: nothing to do
        let bytes = encode_one(Block::Style(StyleChange::headline()), &mut state);
        assert!(bytes.is_empty());

        let bytes = encode_one(Block::Style(StyleChange::normal()), &mut state);
        assert_eq!(bytes, vec![0x1B, b'E', 0, 0x1D, b'!', 0x00]);
        assert_eq!(state.alignment, Alignment::Center);
    }

    #[test]
    fn test_partial_scale_change_keeps_other_axis() {
        let mut state = AttributeState::default();
        let change = StyleChange {
            scale_x: Some(3),
            ..StyleChange::default()
        };
        let bytes = encode_one(Block::Style(change), &mut state);
        assert_eq!(bytes, vec![0x1D, b'!', 0x20]);
        assert_eq!((state.scale_x, state.scale_y), (3, 1));
    }

    #[test]
    fn test_line_spacing_and_restore() {
        let mut state = AttributeState::default();
        let bytes = encode_one(Block::Style(StyleChange::new().line_spacing(140)), &mut state);
        assert_eq!(bytes, vec![0x1B, b'3', 140]);

        let bytes = encode_one(Block::Style(StyleChange::new().line_spacing(0)), &mut state);
        assert_eq!(bytes, vec![0x1B, b'2']);
    }

    #[test]
    fn test_text_is_encoded_and_terminated() {
        let mut state = AttributeState::default();
        let bytes = encode_one(Block::text("없음"), &mut state);
        assert_eq!(bytes, vec![0xBE, 0xF8, 0xC0, 0xBD, 0x0A]);
    }

    #[test]
    fn test_rule_follows_font_and_scale() {
        let mut state = AttributeState::default();
        let bytes = encode_one(Block::Rule, &mut state);
        assert_eq!(bytes.len(), 48 + 1);
        assert!(bytes[..48].iter().all(|&b| b == b'-'));

        state.apply(&StyleChange::new().font(Font::B).scale(2, 1));
        let bytes = encode_one(Block::Rule, &mut state);
        assert_eq!(bytes.len(), 32 + 1);
    }

    #[test]
    fn test_structural_blocks() {
        let mut state = AttributeState::default();
        assert_eq!(encode_one(Block::Feed, &mut state), vec![0x0A]);
        assert_eq!(encode_one(Block::Cut, &mut state), vec![0x1D, 0x56, 0x41, 3]);
    }

    #[test]
    fn test_image_wraps_bit_image_with_spacing() {
        let mut state = AttributeState::default();
        state.apply(&StyleChange::new().line_spacing(60));

        let raster = RasterImage::new(24, 24, vec![0xFF; 3 * 24]);
        let bytes = encode_one(
            Block::Image {
                raster,
                density: Density::D24,
            },
            &mut state,
        );

        assert_eq!(&bytes[..3], &[0x1B, b'3', 0]);
        assert_eq!(&bytes[3..8], &[0x1B, b'*', 33, 24, 0]);
        assert_eq!(&bytes[bytes.len() - 3..], &[0x1B, b'3', 60]);
        assert_eq!(state.line_spacing, 60);
    }

    #[test]
    fn test_oversized_image_rejected() {
        let mut state = AttributeState::default();
        let raster = RasterImage::new(600, 1, vec![0; 75]);
        let result = Block::Image {
            raster,
            density: Density::D24,
        }
        .encode(&mut state, &config());
        assert!(matches!(result, Err(InkslipError::ImageUnavailable(_))));
    }

    #[test]
    fn test_qr_block_is_one_raster() {
        let mut state = AttributeState::default();
        let bytes = encode_one(Block::qr("https://github.com/acme/widgets/issues/42"), &mut state);

        assert_eq!(&bytes[..4], &[0x1D, b'v', b'0', 3]);
        let width_bytes = u16::from_le_bytes([bytes[4], bytes[5]]) as usize;
        let height = u16::from_le_bytes([bytes[6], bytes[7]]) as usize;
        assert_eq!(bytes.len(), 8 + width_bytes * height);
    }

    #[test]
    fn test_fit_scale() {
        assert_eq!(fit_scale(RasterScale::Quadruple, 148, 590), Some(RasterScale::Quadruple));
        assert_eq!(fit_scale(RasterScale::Quadruple, 300, 590), Some(RasterScale::Normal));
        assert_eq!(fit_scale(RasterScale::Normal, 600, 590), None);
    }

    #[test]
    fn test_block_order_is_preserved() {
        let program: Program = vec![
            Block::text("a"),
            Block::Feed,
            Block::text("b"),
            Block::Cut,
        ]
        .into_iter()
        .collect();
        let bytes = program.to_bytes(&config()).unwrap();
        assert_eq!(&bytes[4..], &[b'a', 0x0A, 0x0A, b'b', 0x0A, 0x1D, 0x56, 0x41, 3]);
    }
}
