//! # Rendering Module
//!
//! Everything that turns pixels into printer-ready 1-bit rasters.
//!
//! ## Modules
//!
//! - [`dither`]: two-level quantization (threshold, Bayer 8x8)
//! - [`preprocess`]: decode, resize, contrast, sharpen and quantize source images
//! - [`fetch`]: download remote images (avatars)
//! - [`qr`]: QR code rasterization
//!
//! ## Usage Example
//!
//! ```
//! use inkslip::render::qr;
//!
//! let img = qr::rasterize("https://github.com", 4, 4).unwrap();
//! assert_eq!(img.width, img.height);
//! assert_eq!(img.data.len(), img.width_bytes() * img.height as usize);
//! ```

pub mod dither;
pub mod fetch;
pub mod preprocess;
pub mod qr;
mod raster;

pub use raster::RasterImage;
