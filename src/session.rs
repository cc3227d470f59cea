//! # Device Session
//!
//! One print job's exclusive use of the printer.
//!
//! ```text
//!            open ok            all bytes written
//! Closed ──► Opening ──────────► Open ───────────────────► Closing ──► Closed
//!               │                  │                          ▲
//!               │ open error       │ write error              │ best-effort
//!               ▼                  ▼                          │ release
//!             Failed             Failed ──────────────────────┘
//! ```
//!
//! `Closing` always ends in `Closed`: the connection is consumed by the
//! release whether or not it reports an error. A release error after a
//! clean write is surfaced through [`SessionOutcome::result`].
//!
//! A session is driven by [`DeviceSession::run`], which consumes it: there
//! is no way to write to a session after it has been released. `run` is
//! blocking and belongs on a blocking thread.

use tracing::{debug, warn};

use crate::error::InkslipError;
use crate::transport::Device;

/// Lifecycle states of a [`DeviceSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opening,
    Open,
    Closing,
    Failed,
}

impl SessionState {
    /// Whether the session currently holds (or is acquiring) the device.
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Opening | SessionState::Open)
    }
}

/// What happened during a session.
#[derive(Debug)]
pub struct SessionOutcome {
    /// Every state entered, in order, starting after `Closed`.
    pub transitions: Vec<SessionState>,
    /// Bytes written on success.
    pub result: Result<usize, InkslipError>,
}

impl SessionOutcome {
    /// State the session ended in.
    pub fn final_state(&self) -> SessionState {
        self.transitions.last().copied().unwrap_or(SessionState::Closed)
    }

    pub fn into_result(self) -> Result<usize, InkslipError> {
        self.result
    }
}

/// Exclusive-access wrapper around one connection to a [`Device`].
pub struct DeviceSession<'a> {
    device: &'a dyn Device,
    state: SessionState,
    transitions: Vec<SessionState>,
}

impl<'a> DeviceSession<'a> {
    pub fn new(device: &'a dyn Device) -> Self {
        Self {
            device,
            state: SessionState::Closed,
            transitions: Vec::with_capacity(4),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn enter(&mut self, state: SessionState) {
        debug!(device = %self.device.describe(), from = ?self.state, to = ?state, "session transition");
        self.state = state;
        self.transitions.push(state);
    }

    /// Open the device, write `data`, and release the device.
    ///
    /// The device is released on every path that opened it. A release
    /// failure after a write failure is logged and the write failure is
    /// returned; after a clean write it is returned as `DeviceWriteFailed`.
    pub fn run(mut self, data: &[u8]) -> SessionOutcome {
        let result = self.drive(data);
        SessionOutcome {
            transitions: self.transitions,
            result,
        }
    }

    fn drive(&mut self, data: &[u8]) -> Result<usize, InkslipError> {
        self.enter(SessionState::Opening);
        let mut conn = match self.device.open() {
            Ok(conn) => conn,
            Err(e) => {
                self.enter(SessionState::Failed);
                return Err(InkslipError::DeviceUnavailable(format!(
                    "{}: {}",
                    self.device.describe(),
                    e
                )));
            }
        };
        self.enter(SessionState::Open);

        if let Err(e) = conn.write_all(data) {
            self.enter(SessionState::Failed);
            self.enter(SessionState::Closing);
            if let Err(close_err) = conn.close() {
                warn!(device = %self.device.describe(), error = %close_err, "release after write failure failed");
            }
            self.enter(SessionState::Closed);
            return Err(InkslipError::DeviceWriteFailed(e.to_string()));
        }

        self.enter(SessionState::Closing);
        let released = conn.close();
        self.enter(SessionState::Closed);
        match released {
            Ok(()) => Ok(data.len()),
            Err(e) => Err(InkslipError::DeviceWriteFailed(format!("close failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Connection;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::sync::{Arc, Mutex};

    use SessionState::*;

    #[derive(Default)]
    struct Log {
        written: Vec<u8>,
        closed: usize,
    }

    /// Device that fails at a chosen step.
    struct FakeDevice {
        fail_open: bool,
        fail_write: bool,
        fail_close: bool,
        log: Arc<Mutex<Log>>,
    }

    impl FakeDevice {
        fn new() -> Self {
            Self {
                fail_open: false,
                fail_write: false,
                fail_close: false,
                log: Arc::default(),
            }
        }
    }

    struct FakeConnection {
        fail_write: bool,
        fail_close: bool,
        log: Arc<Mutex<Log>>,
    }

    impl Device for FakeDevice {
        fn describe(&self) -> String {
            "fake".into()
        }

        fn open(&self) -> io::Result<Box<dyn Connection>> {
            if self.fail_open {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such device"));
            }
            Ok(Box::new(FakeConnection {
                fail_write: self.fail_write,
                fail_close: self.fail_close,
                log: self.log.clone(),
            }))
        }
    }

    impl Connection for FakeConnection {
        fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            if self.fail_write {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
            }
            self.log.lock().unwrap().written.extend_from_slice(data);
            Ok(())
        }

        fn close(self: Box<Self>) -> io::Result<()> {
            self.log.lock().unwrap().closed += 1;
            if self.fail_close {
                return Err(io::Error::other("close failed"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_successful_session() {
        let device = FakeDevice::new();
        let outcome = DeviceSession::new(&device).run(b"receipt");

        assert_eq!(outcome.transitions, vec![Opening, Open, Closing, Closed]);
        assert_eq!(outcome.final_state(), Closed);
        assert_eq!(outcome.result.unwrap(), 7);

        let log = device.log.lock().unwrap();
        assert_eq!(log.written, b"receipt");
        assert_eq!(log.closed, 1);
    }

    #[test]
    fn test_open_failure() {
        let device = FakeDevice {
            fail_open: true,
            ..FakeDevice::new()
        };
        let outcome = DeviceSession::new(&device).run(b"receipt");

        assert_eq!(outcome.transitions, vec![Opening, Failed]);
        assert!(matches!(outcome.result, Err(InkslipError::DeviceUnavailable(_))));
        assert_eq!(device.log.lock().unwrap().closed, 0);
    }

    #[test]
    fn test_write_failure_still_releases() {
        let device = FakeDevice {
            fail_write: true,
            ..FakeDevice::new()
        };
        let outcome = DeviceSession::new(&device).run(b"receipt");

        assert_eq!(outcome.transitions, vec![Opening, Open, Failed, Closing, Closed]);
        assert!(matches!(outcome.result, Err(InkslipError::DeviceWriteFailed(_))));
        assert!(!outcome.final_state().is_active());
        assert_eq!(device.log.lock().unwrap().closed, 1);
    }

    #[test]
    fn test_close_failure_during_recovery_keeps_write_error() {
        let device = FakeDevice {
            fail_write: true,
            fail_close: true,
            ..FakeDevice::new()
        };
        let outcome = DeviceSession::new(&device).run(b"receipt");

        assert_eq!(outcome.final_state(), Closed);
        let err = outcome.result.unwrap_err();
        assert!(err.to_string().contains("unplugged"), "{}", err);
    }

    #[test]
    fn test_close_failure_after_success_is_an_error() {
        let device = FakeDevice {
            fail_close: true,
            ..FakeDevice::new()
        };
        let outcome = DeviceSession::new(&device).run(b"receipt");

        assert_eq!(outcome.transitions, vec![Opening, Open, Closing, Closed]);
        assert!(matches!(outcome.result, Err(InkslipError::DeviceWriteFailed(_))));
        assert_eq!(device.log.lock().unwrap().closed, 1);
    }

    #[test]
    fn test_failed_is_only_entered_from_opening_or_open() {
        let cases = [
            FakeDevice::new(),
            FakeDevice { fail_open: true, ..FakeDevice::new() },
            FakeDevice { fail_write: true, ..FakeDevice::new() },
            FakeDevice { fail_close: true, ..FakeDevice::new() },
            FakeDevice { fail_write: true, fail_close: true, ..FakeDevice::new() },
        ];
        for device in cases {
            let outcome = DeviceSession::new(&device).run(b"receipt");
            for pair in outcome.transitions.windows(2) {
                if pair[1] == Failed {
                    assert!(matches!(pair[0], Opening | Open), "{:?}", outcome.transitions);
                }
                if pair[0] == Closing {
                    assert_eq!(pair[1], Closed, "{:?}", outcome.transitions);
                }
            }
        }
    }

    #[test]
    fn test_new_session_is_closed() {
        let device = FakeDevice::new();
        assert_eq!(DeviceSession::new(&device).state(), Closed);
        assert!(Open.is_active());
        assert!(!Closing.is_active());
    }
}
