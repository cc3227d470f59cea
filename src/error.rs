//! # Error Types
//!
//! This module defines error types used throughout the inkslip library.
//!
//! The variants double as the failure classification handed back to the
//! caller of a print job, so the HTTP layer (or any other caller) can tell
//! whether retrying is worthwhile.

use thiserror::Error;

/// Main error type for inkslip operations
#[derive(Debug, Error)]
pub enum InkslipError {
    /// The printer could not be opened (missing device, permissions, busy).
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A write failed after the printer was opened.
    #[error("Device write failed: {0}")]
    DeviceWriteFailed(String),

    /// An image could not be fetched, decoded or transformed.
    #[error("Image unavailable: {0}")]
    ImageUnavailable(String),

    /// The event is structurally invalid and cannot be rendered.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The print queue worker has shut down.
    #[error("Print queue closed")]
    QueueClosed,

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InkslipError {
    /// Whether submitting the same job again may succeed.
    ///
    /// Device failures are transient from the process's point of view (the
    /// next job reopens the port). Bad input stays bad.
    pub fn is_retryable(&self) -> bool {
        match self {
            InkslipError::DeviceUnavailable(_)
            | InkslipError::DeviceWriteFailed(_)
            | InkslipError::Io(_) => true,
            InkslipError::ImageUnavailable(_)
            | InkslipError::MalformedEvent(_)
            | InkslipError::QueueClosed => false,
        }
    }
}
