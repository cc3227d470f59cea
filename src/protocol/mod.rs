//! # ESC/POS Protocol Implementation
//!
//! This module provides low-level command builders for the ESC/POS protocol
//! spoken by generic thermal receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, feed, cut)
//! - [`text`]: Text styling (alignment, font, bold, size, spacing) and EUC-KR encoding
//! - [`graphics`]: Bit image and raster graphics commands
//!
//! ## Usage Example
//!
//! ```
//! use inkslip::protocol::{commands, text};
//! use inkslip::protocol::text::Alignment;
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(commands::korean_mode());
//! data.extend(text::align(Alignment::Center));
//! data.extend(text::bold(true));
//! data.extend(text::encode("새이슈!\n"));
//! data.extend(commands::cut(3));
//! ```

pub mod commands;
pub mod graphics;
pub mod text;
