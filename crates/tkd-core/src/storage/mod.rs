//! Disk I/O for part files.
//!
//! Part files are written in place under their final name: appended to when
//! resuming, created or truncated otherwise. Nothing is removed on failure,
//! so the next run resumes from whatever landed on disk.

mod space;
mod writer;

pub use space::available_bytes;
pub use writer::{PartWriter, WriteMode};

use std::io;
use std::path::Path;

/// Current length of the file at `path`, or `None` when it does not exist.
pub fn local_len(path: &Path) -> io::Result<Option<u64>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_len_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("takeout-001.zip");
        assert_eq!(local_len(&path).unwrap(), None);
        std::fs::write(&path, b"abcd").unwrap();
        assert_eq!(local_len(&path).unwrap(), Some(4));
    }

    #[test]
    fn append_then_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.zip");
        std::fs::write(&path, b"hello ").unwrap();

        let mut w = PartWriter::open(&path, WriteMode::Append, 16).unwrap();
        w.write_chunk(b"world").unwrap();
        assert_eq!(w.written(), 5);
        w.finish().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello world");

        let mut w = PartWriter::open(&path, WriteMode::Truncate, 16).unwrap();
        w.write_chunk(b"new").unwrap();
        w.finish().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn truncate_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.zip");
        let mut w = PartWriter::open(&path, WriteMode::Truncate, 4).unwrap();
        w.write_chunk(b"0123456789").unwrap();
        w.finish().unwrap();
        assert_eq!(local_len(&path).unwrap(), Some(10));
    }

    #[test]
    fn append_requires_nothing_to_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.zip");
        let mut w = PartWriter::open(&path, WriteMode::Append, 4).unwrap();
        w.write_chunk(b"xy").unwrap();
        w.finish().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"xy");
    }

    #[cfg(unix)]
    #[test]
    fn free_space_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(available_bytes(dir.path()).unwrap() > 0);
    }
}
