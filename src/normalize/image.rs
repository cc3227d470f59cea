//! Uploaded image receipt layout: just the picture.

use crate::ir::{Block, Program, StyleChange};
use crate::protocol::graphics::Density;
use crate::protocol::text::Alignment;
use crate::render::RasterImage;

pub fn blocks(raster: RasterImage) -> Program {
    Program::from_iter([
        Block::Style(StyleChange::new().align(Alignment::Center)),
        Block::Image {
            raster,
            density: Density::D24,
        },
        Block::Feed,
        Block::Cut,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_receipt_has_no_text() {
        let program = blocks(RasterImage::new(8, 1, vec![0xFF]));
        assert_eq!(program.texts().count(), 0);
        assert_eq!(program.len(), 4);
        assert_eq!(program.blocks.last(), Some(&Block::Cut));
    }
}
