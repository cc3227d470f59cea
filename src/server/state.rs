//! Server state and configuration.

use std::time::Duration;

use crate::spool::PrintQueue;

/// How long a request waits for its receipt before answering 504.
pub const PRINT_TIMEOUT: Duration = Duration::from_secs(120);

/// Largest accepted request body (uploaded screenshots are base64).
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:3000")
    pub listen_addr: String,
    /// Per-request wait for the print job
    pub print_timeout: Duration,
}

impl ServerConfig {
    /// Listen on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            listen_addr: format!("0.0.0.0:{}", port),
            print_timeout: PRINT_TIMEOUT,
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub queue: PrintQueue,
    pub print_timeout: Duration,
}

impl AppState {
    pub fn new(queue: PrintQueue, print_timeout: Duration) -> Self {
        Self {
            queue,
            print_timeout,
        }
    }
}
