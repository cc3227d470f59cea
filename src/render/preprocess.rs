//! # Image Preprocessing
//!
//! Turns arbitrary source images (remote avatars, the letterhead logo,
//! uploaded screenshots) into [`RasterImage`]s the printer can take.
//!
//! ## Pipeline
//!
//! The steps are order-sensitive:
//!
//! ```text
//! decode ─► resize ─► flatten alpha + grayscale ─► linear contrast ─► sharpen ─► quantize
//! ```
//!
//! - **resize**: exact box (avatars), full width keeping aspect ratio
//!   (uploaded images), or shrink-only (logo). The result is never wider than
//!   the printer head; wider sources are scaled down, never cropped.
//! - **linear contrast**: `out = gain * in + offset` on 0–255 values. The
//!   default (0.85, -30) darkens midtones so light UI grays survive the cut.
//! - **sharpen**: unsharp mask, applied before quantization so edges stay
//!   crisp on the thermal head.
//! - **quantize**: two levels, see [`crate::render::dither`].
//!
//! Everything happens in memory; no scratch files are written.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use image::{DynamicImage, GrayImage, Luma, imageops, imageops::FilterType};
use thiserror::Error;

use super::dither::{self, DitheringAlgorithm};
use super::raster::RasterImage;
use crate::error::InkslipError;

/// Side length of the assignee avatar icon, in dots.
pub const AVATAR_SIZE: u32 = 24;

/// Default linear contrast gain.
pub const CONTRAST_GAIN: f32 = 0.85;

/// Default linear contrast offset (0–255 scale).
pub const CONTRAST_OFFSET: f32 = -30.0;

/// Unsharp mask radius.
const SHARPEN_SIGMA: f32 = 1.0;

/// Why an image could not be turned into a raster.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// The image could not be downloaded.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The payload is not valid base64 or not a decodable image.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The image decoded but the requested transform is impossible.
    #[error("transform failed: {0}")]
    Transform(String),
}

impl From<PreprocessError> for InkslipError {
    fn from(err: PreprocessError) -> Self {
        InkslipError::ImageUnavailable(err.to_string())
    }
}

/// Target bounding box for the resize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTarget {
    /// Exactly this size, ignoring aspect ratio.
    Exact { width: u32, height: u32 },
    /// This width (up- or downscaled), height follows the aspect ratio.
    Width(u32),
    /// Shrink to at most this width; never upscale.
    FitWidth(u32),
}

/// A configured preprocessing pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipeline {
    pub resize: ResizeTarget,
    pub gain: f32,
    pub offset: f32,
    pub sharpen: bool,
    pub dither: DitheringAlgorithm,
}

impl Pipeline {
    /// 24x24 assignee avatar. Plain resize and threshold, no contrast games.
    pub fn avatar() -> Self {
        Self {
            resize: ResizeTarget::Exact {
                width: AVATAR_SIZE,
                height: AVATAR_SIZE,
            },
            gain: 1.0,
            offset: 0.0,
            sharpen: false,
            dither: DitheringAlgorithm::Threshold,
        }
    }

    /// Letterhead logo: printed at its own size unless wider than the head.
    pub fn logo(max_width: u16) -> Self {
        Self {
            resize: ResizeTarget::FitWidth(max_width as u32),
            gain: 1.0,
            offset: 0.0,
            sharpen: false,
            dither: DitheringAlgorithm::Threshold,
        }
    }

    /// Full-width content (uploaded screenshots and photos).
    pub fn full_width(width: u16) -> Self {
        Self {
            resize: ResizeTarget::Width(width as u32),
            gain: CONTRAST_GAIN,
            offset: CONTRAST_OFFSET,
            sharpen: true,
            dither: DitheringAlgorithm::Threshold,
        }
    }

    /// Same pipeline with a different quantizer.
    pub fn with_dither(mut self, dither: DitheringAlgorithm) -> Self {
        self.dither = dither;
        self
    }

    /// Run the pipeline on a decoded image.
    ///
    /// `max_width` is the printer's physical dot width; the output is never
    /// wider.
    pub fn run(&self, source: &DynamicImage, max_width: u16) -> Result<RasterImage, PreprocessError> {
        let (width, height) = self.target_dimensions(source.width(), source.height(), max_width)?;

        let resized = if (width, height) == (source.width(), source.height()) {
            source.clone()
        } else {
            source.resize_exact(width, height, FilterType::Lanczos3)
        };

        let gray = flatten_to_gray(&resized);
        let adjusted = linear(&gray, self.gain, self.offset);
        let finished = if self.sharpen {
            imageops::unsharpen(&adjusted, SHARPEN_SIGMA, 0)
        } else {
            adjusted
        };

        let data = dither::generate_raster(
            width as usize,
            height as usize,
            |x, y| 1.0 - finished.get_pixel(x as u32, y as u32)[0] as f32 / 255.0,
            self.dither,
        );

        Ok(RasterImage::new(width as u16, height as u16, data))
    }

    /// Compute the output size for a source of `src_w` x `src_h`.
    fn target_dimensions(
        &self,
        src_w: u32,
        src_h: u32,
        max_width: u16,
    ) -> Result<(u32, u32), PreprocessError> {
        if max_width == 0 {
            return Err(PreprocessError::Transform("printer width is 0".into()));
        }
        if src_w == 0 || src_h == 0 {
            return Err(PreprocessError::Transform(format!(
                "source image is empty ({}x{})",
                src_w, src_h
            )));
        }

        let max_width = max_width as u32;
        let (width, height) = match self.resize {
            ResizeTarget::Exact { width, height } => {
                if width == 0 || height == 0 {
                    return Err(PreprocessError::Transform(format!(
                        "invalid target size {}x{}",
                        width, height
                    )));
                }
                (width.min(max_width), height)
            }
            ResizeTarget::Width(width) => {
                if width == 0 {
                    return Err(PreprocessError::Transform("invalid target width 0".into()));
                }
                let width = width.min(max_width);
                (width, scaled_height(src_w, src_h, width))
            }
            ResizeTarget::FitWidth(width) => {
                if width == 0 {
                    return Err(PreprocessError::Transform("invalid target width 0".into()));
                }
                let width = width.min(max_width).min(src_w);
                (width, scaled_height(src_w, src_h, width))
            }
        };

        if height > u16::MAX as u32 {
            return Err(PreprocessError::Transform(format!(
                "image too tall after resize ({} rows)",
                height
            )));
        }

        Ok((width, height))
    }
}

fn scaled_height(src_w: u32, src_h: u32, width: u32) -> u32 {
    let aspect = src_h as f64 / src_w as f64;
    ((width as f64 * aspect).round() as u32).max(1)
}

/// Composite over white and convert to 8-bit luma.
///
/// Transparent PNG regions (avatars, screenshots of rounded cards) would
/// otherwise come out black.
fn flatten_to_gray(img: &DynamicImage) -> GrayImage {
    let rgba = img.to_rgba8();
    let mut gray = GrayImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        let alpha = a as f32 / 255.0;
        let blended = luma * alpha + 255.0 * (1.0 - alpha);
        gray.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
    }

    gray
}

/// Linear contrast: `out = gain * in + offset`, clamped to 0–255.
fn linear(img: &GrayImage, gain: f32, offset: f32) -> GrayImage {
    if gain == 1.0 && offset == 0.0 {
        return img.clone();
    }

    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        let value = gain * pixel[0] as f32 + offset;
        pixel[0] = value.round().clamp(0.0, 255.0) as u8;
    }
    out
}

// ============================================================================
// DECODING
// ============================================================================

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Standard alphabet, padding optional.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// URL-safe alphabet, padding optional.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Decode base64 image text, with or without a `data:image/...;base64,` prefix.
///
/// Accepts the standard and URL-safe alphabets, padded or not, and ignores
/// embedded whitespace (payloads are often line-wrapped).
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, PreprocessError> {
    let body = match payload.trim_start().strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| PreprocessError::Decode("data URL without payload".into()))?;
            if !meta.ends_with(";base64") {
                return Err(PreprocessError::Decode(format!(
                    "data URL is not base64 ({})",
                    meta
                )));
            }
            data
        }
        None => payload,
    };

    let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(PreprocessError::Decode("empty image payload".into()));
    }

    STANDARD_LENIENT
        .decode(&cleaned)
        .or_else(|e| URL_SAFE_LENIENT.decode(&cleaned).map_err(|_| e))
        .map_err(|e| PreprocessError::Decode(format!("invalid base64: {}", e)))
}

/// Decode image bytes (PNG, JPEG, GIF, ...).
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
    image::load_from_memory(bytes)
        .map_err(|e| PreprocessError::Decode(format!("failed to decode image: {}", e)))
}

/// Decode bytes and run a pipeline in one go.
pub fn rasterize(bytes: &[u8], pipeline: &Pipeline, max_width: u16) -> Result<RasterImage, PreprocessError> {
    let source = decode_image(bytes)?;
    pipeline.run(&source, max_width)
}

// ============================================================================
// TESTS
// ============================================================================
