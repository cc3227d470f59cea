//! # Print Blocks
//!
//! The canonical receipt representation. A [`Program`] is an ordered list of
//! [`Block`]s; order is print order.
//!
//! ```text
//! Normalizer → Program (inspectable) → Codegen → Bytes
//! ```
//!
//! Style is carried by explicit [`StyleChange`] blocks rather than being
//! attached to text, mirroring the printer's own stateful attribute model.

use crate::protocol::graphics::{Density, RasterScale};
use crate::protocol::text::{Alignment, Font};
use crate::render::RasterImage;

/// Partial update to the printer's attribute set. `None` means "no change".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleChange {
    pub alignment: Option<Alignment>,
    pub font: Option<Font>,
    pub bold: Option<bool>,
    pub scale_x: Option<u8>,
    pub scale_y: Option<u8>,
    /// Line spacing in dots; 0 restores the device default.
    pub line_spacing: Option<u8>,
}

impl StyleChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn scale(mut self, x: u8, y: u8) -> Self {
        self.scale_x = Some(x);
        self.scale_y = Some(y);
        self
    }

    pub fn line_spacing(mut self, dots: u8) -> Self {
        self.line_spacing = Some(dots);
        self
    }

    /// Large, bold, centered headline.
    pub fn headline() -> Self {
        Self::new().align(Alignment::Center).font(Font::A).bold(true).scale(2, 1)
    }

    /// Plain body text: regular weight, 1x scale. Alignment untouched.
    pub fn normal() -> Self {
        Self::new().bold(false).scale(1, 1)
    }

    /// Whether this change touches no attribute at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One unit of print content or formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Attribute update. Never prints anything itself.
    Style(StyleChange),

    /// A line of (already sanitized) text. A line feed follows it.
    Text(String),

    /// A preprocessed image sent as a bit image.
    Image { raster: RasterImage, density: Density },

    /// QR code for `data`, `size` dots per module with a `margin`-module
    /// quiet zone, sent as a raster image.
    Qr {
        data: String,
        size: u8,
        margin: u8,
        scale: RasterScale,
    },

    /// Horizontal rule across the paper width.
    Rule,

    /// Empty line.
    Feed,

    /// Feed and cut.
    Cut,
}

impl Block {
    /// Text block from anything string-like.
    pub fn text(s: impl Into<String>) -> Self {
        Block::Text(s.into())
    }

    /// QR block with the usual receipt parameters.
    pub fn qr(data: impl Into<String>) -> Self {
        Block::Qr {
            data: data.into(),
            size: 4,
            margin: 4,
            scale: RasterScale::Quadruple,
        }
    }

    /// Printable text carried by this block, if any.
    pub fn text_payload(&self) -> Option<&str> {
        match self {
            Block::Text(s) => Some(s),
            Block::Qr { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// An ordered receipt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub blocks: Vec<Block>,
}

impl Program {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn extend(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.blocks.extend(blocks);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// All text lines, in order. Handy for inspecting a receipt.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

impl FromIterator<Block> for Program {
    fn from_iter<T: IntoIterator<Item = Block>>(iter: T) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Program {
    type Item = Block;
    type IntoIter = std::vec::IntoIter<Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.into_iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_change_builders() {
        let change = StyleChange::headline();
        assert_eq!(change.alignment, Some(Alignment::Center));
        assert_eq!(change.bold, Some(true));
        assert_eq!((change.scale_x, change.scale_y), (Some(2), Some(1)));
        assert_eq!(change.font, Some(Font::A));
        assert_eq!(change.line_spacing, None);
    }

    #[test]
    fn test_empty_style_change() {
        assert!(StyleChange::new().is_empty());
        assert!(!StyleChange::new().line_spacing(0).is_empty());
    }

    #[test]
    fn test_structural_blocks_carry_no_text() {
        for block in [Block::Rule, Block::Feed, Block::Cut, Block::Style(StyleChange::normal())] {
            assert_eq!(block.text_payload(), None);
        }
        assert_eq!(Block::text("hi").text_payload(), Some("hi"));
    }

    #[test]
    fn test_program_texts() {
        let program: Program = vec![
            Block::Style(StyleChange::headline()),
            Block::text("title"),
            Block::Rule,
            Block::text("body"),
            Block::Cut,
        ]
        .into_iter()
        .collect();

        assert_eq!(program.len(), 5);
        assert_eq!(program.texts().collect::<Vec<_>>(), vec!["title", "body"]);
    }
}
