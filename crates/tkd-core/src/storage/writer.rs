//! Sequential writer for one part file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// How the part file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Keep existing bytes and write after them (resume).
    Append,
    /// Create, or cut an existing file to zero length (fresh fetch).
    Truncate,
}

/// Buffered writer for a part file; counts the bytes written through it.
pub struct PartWriter {
    out: BufWriter<File>,
    written: u64,
}

impl PartWriter {
    /// Opens `path` in `mode` with a write buffer of `buffer_size` bytes.
    pub fn open(path: &Path, mode: WriteMode, buffer_size: usize) -> io::Result<Self> {
        let mut options = File::options();
        options.create(true);
        match mode {
            WriteMode::Append => options.append(true),
            WriteMode::Truncate => options.write(true).truncate(true),
        };
        let file = options.open(path)?;
        Ok(Self {
            out: BufWriter::with_capacity(buffer_size.max(1), file),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.out.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written since `open`.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flushes the buffer and syncs file data to disk.
    pub fn finish(self) -> io::Result<()> {
        let file = self.out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}
