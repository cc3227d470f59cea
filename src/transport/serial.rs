//! # Serial Transport
//!
//! Talks to the printer over a serial TTY, typically the USB CDC-ACM port
//! the printer enumerates as (`/dev/ttyACM0`).
//!
//! ## TTY Configuration
//!
//! The port is opened in raw mode so binary data is transmitted without
//! modification:
//!
//! - **No input processing**: Disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No output processing**: Disable OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8 (8 data bits, no parity)
//! - **No echo**: Disable ECHO, ECHONL
//! - **Non-canonical mode**: Disable ICANON (no line buffering)
//! - **No modem control**: CLOCAL, so a missing DCD line does not block
//!
//! and the line speed is set to the configured baud rate.
//!
//! ## Chunked Writes
//!
//! Large data blocks are written in chunks with a small delay between them,
//! so the printer's receive buffer keeps up with image data at 9600 baud.
//! Closing waits (`tcdrain`) until the last byte has left the UART.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::{Connection, Device};

/// Default serial device path
pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";

/// Line speed of the printer's serial link.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Serial Printer Device
///
/// ## Example
///
/// ```no_run
/// use inkslip::transport::{Device, SerialDevice};
/// use inkslip::protocol::commands;
///
/// let device = SerialDevice::new("/dev/ttyACM0", 9600);
/// let mut conn = device.open()?;
/// conn.write_all(&commands::init())?;
/// conn.close()?;
///
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SerialDevice {
    path: PathBuf,
    baud_rate: u32,
}

impl SerialDevice {
    pub fn new(path: impl Into<PathBuf>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
        }
    }
}

impl Device for SerialDevice {
    fn describe(&self) -> String {
        format!("{} @ {} baud", self.path.display(), self.baud_rate)
    }

    /// Open the port and configure it.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist (printer unplugged)
    /// - Permission denied (user not in the dialout group)
    /// - The path is not a TTY or the baud rate is unsupported
    fn open(&self) -> io::Result<Box<dyn Connection>> {
        let file = open_port(&self.path, self.baud_rate)?;

        Ok(Box::new(SerialConnection {
            file,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        }))
    }
}

struct SerialConnection {
    file: File,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl Connection for SerialConnection {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        if data.len() <= self.chunk_size {
            return self.file.write_all(data);
        }

        for chunk in data.chunks(self.chunk_size) {
            self.file.write_all(chunk)?;
            if !self.chunk_delay.is_zero() {
                thread::sleep(self.chunk_delay);
            }
        }
        Ok(())
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.file.flush()?;
        drain(&self.file)
    }
}

/// Open `path` write-only as a raw TTY running at `baud`.
#[cfg(unix)]
fn open_port(path: &Path, baud: u32) -> io::Result<File> {
    let speed = baud_to_speed(baud)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("unsupported baud rate {}", baud)))?;

    let file = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NOCTTY)
        .open(path)?;

    configure_tty_raw(file.as_raw_fd(), speed)?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_port(path: &Path, _baud: u32) -> io::Result<File> {
    // No termios here; the port keeps whatever settings the OS gave it.
    OpenOptions::new().write(true).open(path)
}

/// Block until everything written to `file` has left the UART.
#[cfg(unix)]
fn drain(file: &File) -> io::Result<()> {
    let result = unsafe { libc::tcdrain(file.as_raw_fd()) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn drain(_file: &File) -> io::Result<()> {
    Ok(())
}

/// Map a numeric baud rate to its termios speed constant.
#[cfg(unix)]
fn baud_to_speed(baud: u32) -> Option<libc::speed_t> {
    Some(match baud {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        _ => return None,
    })
}

/// Configure a file descriptor for raw TTY mode at `speed`.
///
/// ## What Gets Disabled
///
/// - **Input flags**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR, ICRNL, IXON, IXOFF, IXANY
/// - **Output flags**: OPOST
/// - **Local flags**: ECHO, ECHONL, ICANON, ISIG, IEXTEN
/// - **Control flags**: CSIZE, PARENB (then CS8 | CLOCAL | CREAD is set)
///
/// Note: IXON/IXOFF/IXANY disable XON/XOFF software flow control. 0x11 and
/// 0x13 appear in bit-image data and must not be swallowed.
#[cfg(unix)]
fn configure_tty_raw(fd: i32, speed: libc::speed_t) -> io::Result<()> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8 | libc::CLOCAL | libc::CREAD;

    let result = unsafe {
        if libc::cfsetispeed(&mut termios, speed) != 0 || libc::cfsetospeed(&mut termios, speed) != 0 {
            -1
        } else {
            libc::tcsetattr(fd, libc::TCSANOW, &termios)
        }
    };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
