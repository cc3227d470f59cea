//! File transport: writes the raw ESC/POS stream to a file.
//!
//! Handy for inspecting a job (`xxd receipt.bin`) or for sending it later
//! with `cat receipt.bin > /dev/ttyACM0`.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use super::{Connection, Device};

/// Each job truncates and rewrites the file.
#[derive(Debug, Clone)]
pub struct FileDevice {
    path: PathBuf,
}

impl FileDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Device for FileDevice {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> io::Result<Box<dyn Connection>> {
        let file = File::create(&self.path)?;
        Ok(Box::new(FileConnection { file }))
    }
}

struct FileConnection {
    file: File,
}

impl Connection for FileConnection {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_all()
    }
}
