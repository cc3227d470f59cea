//! # Inkslip - Webhook Receipt Printer Library
//!
//! Inkslip turns notification events (GitHub issues, todo notes, uploaded
//! images) into receipts on an 80mm ESC/POS thermal printer attached over a
//! serial link. It provides:
//!
//! - **Protocol implementation**: ESC/POS command builders with EUC-KR text
//! - **Normalization**: event payloads to an ordered block program
//! - **Image preprocessing**: resize, contrast, sharpen and dither to 1-bit
//! - **Device sessions**: open, write, release, one job at a time
//! - **Spooling**: a FIFO queue in front of the single printer
//! - **HTTP ingestion**: webhook endpoints feeding the queue
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use inkslip::{
//!     event::EventKind,
//!     normalize::Normalizer,
//!     render::fetch::HttpFetcher,
//!     transport::SerialDevice,
//!     PrintQueue, PrinterConfig,
//! };
//!
//! # async fn example() -> Result<(), inkslip::InkslipError> {
//! let config = PrinterConfig::RECEIPT_80MM;
//! let normalizer = Normalizer::new(Arc::new(HttpFetcher::new()?), config);
//! let device = Arc::new(SerialDevice::new("/dev/ttyACM0", config.baud_rate));
//! let (queue, _worker) = PrintQueue::start(normalizer, device);
//!
//! let event = EventKind::Todo.parse(r##"{"title": "장보기", "user": "mina", "body": "#집 우유"}"##)?;
//! let report = queue.print(event).await?;
//! println!("{} bytes", report.bytes);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`event`] | Event payload types |
//! | [`normalize`] | Event to block program |
//! | [`ir`] | Block program and ESC/POS encoder |
//! | [`protocol`] | ESC/POS command builders |
//! | [`render`] | Image preprocessing, dithering, QR |
//! | [`session`] | Device session state machine |
//! | [`spool`] | FIFO print queue |
//! | [`transport`] | Serial and file devices |
//! | [`server`] | Webhook HTTP server |
//! | [`printer`] | Printer configurations |
//! | [`error`] | Error types |

pub mod error;
pub mod event;
pub mod ir;
pub mod normalize;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod server;
pub mod session;
pub mod spool;
pub mod transport;

// Re-exports for convenience
pub use error::InkslipError;
pub use event::PrintEvent;
pub use printer::PrinterConfig;
pub use spool::PrintQueue;
