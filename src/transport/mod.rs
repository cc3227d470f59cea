//! # Printer Transport Layer
//!
//! Byte sinks the device session writes receipts into.
//!
//! ## Available Transports
//!
//! - [`serial`]: USB CDC-ACM / RS-232 serial port at a fixed baud rate (Linux)
//! - [`file`]: plain file, for capturing a job's bytes instead of printing
//!
//! A [`Device`] is the long-lived handle (a path and line settings); each
//! print job opens its own [`Connection`] and closes it when done.

pub mod file;
pub mod serial;

use std::io;

pub use file::FileDevice;
pub use serial::SerialDevice;

/// Something a print job can be sent to.
pub trait Device: Send + Sync {
    /// Human-readable identity for logs (usually the path).
    fn describe(&self) -> String;

    /// Open an exclusive connection.
    fn open(&self) -> io::Result<Box<dyn Connection>>;
}

/// An open connection to a [`Device`].
pub trait Connection: Send {
    /// Write all of `data`.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush, wait for the bytes to leave, and release the device.
    fn close(self: Box<Self>) -> io::Result<()>;
}
