//! # Print Block Programs
//!
//! The block layer sits between event normalization and raw ESC/POS bytes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────┐
//! │ Normalizer  │ ──► │   Program    │ ──► │ Codegen  │
//! │  (events)   │     │ (Vec<Block>) │     │ (bytes)  │
//! └─────────────┘     └──────────────┘     └──────────┘
//! ```
//!
//! Keeping the blocks around as values means a receipt can be inspected and
//! unit tested without a printer attached.
//!
//! ## Example
//!
//! ```
//! use inkslip::ir::{Block, Program, StyleChange};
//! use inkslip::printer::PrinterConfig;
//!
//! let mut program = Program::new();
//! program.push(Block::Style(StyleChange::headline()));
//! program.push(Block::text("HELLO"));
//! program.push(Block::Rule);
//! program.push(Block::Cut);
//!
//! let bytes = program.to_bytes(&PrinterConfig::RECEIPT_80MM).unwrap();
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//! ```

mod codegen;
mod ops;

pub use codegen::AttributeState;
pub use ops::*;
