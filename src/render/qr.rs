//! QR code rasterization.
//!
//! Renders a payload into a [`RasterImage`] with square modules of
//! `module_size` dots and a quiet zone of `margin` modules on every side.

use qrcode::{Color, QrCode};

use super::dither::pack_row;
use super::preprocess::PreprocessError;
use super::raster::RasterImage;

/// Rasterize `data` as a QR code.
pub fn rasterize(data: &str, module_size: u8, margin: u8) -> Result<RasterImage, PreprocessError> {
    if module_size == 0 {
        return Err(PreprocessError::Transform("QR module size must be at least 1".into()));
    }

    let code = QrCode::new(data.as_bytes())
        .map_err(|e| PreprocessError::Transform(format!("QR encoding failed: {}", e)))?;

    let modules = code.width();
    let colors = code.to_colors();
    let module_size = module_size as usize;
    let margin = margin as usize;
    let side = (modules + 2 * margin) * module_size;

    if side > u16::MAX as usize {
        return Err(PreprocessError::Transform(format!("QR code too large ({} dots)", side)));
    }

    let mut data = Vec::with_capacity(side.div_ceil(8) * side);
    let mut row = vec![false; side];

    for y in 0..side {
        let my = (y / module_size).checked_sub(margin).filter(|&m| m < modules);
        for (x, dot) in row.iter_mut().enumerate() {
            let mx = (x / module_size).checked_sub(margin).filter(|&m| m < modules);
            *dot = match (mx, my) {
                (Some(mx), Some(my)) => colors[my * modules + mx] == Color::Dark,
                _ => false,
            };
        }
        data.extend(pack_row(&row));
    }

    Ok(RasterImage::new(side as u16, side as u16, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_dimensions() {
        // Short payloads fit version 1: 21 modules.
        let img = rasterize("hello", 4, 4).unwrap();
        assert_eq!(img.width, (21 + 8) * 4);
        assert_eq!(img.height, img.width);
    }

    #[test]
    fn test_quiet_zone_is_white() {
        let img = rasterize("hello", 4, 4).unwrap();
        for i in 0..16 {
            assert!(!img.is_black(i, i));
            assert!(!img.is_black(img.width - 1 - i, i));
        }
    }

    #[test]
    fn test_finder_pattern_corner_is_dark() {
        let img = rasterize("hello", 4, 4).unwrap();
        // First module inside the quiet zone is the finder pattern's corner.
        assert!(img.is_black(16, 16));
        assert!(img.is_black(19, 19));
    }

    #[test]
    fn test_zero_module_size_rejected() {
        assert!(rasterize("hello", 0, 4).is_err());
    }
}
