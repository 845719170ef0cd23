//! File-backed or owned data behind a ROOT file.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::stream::StreamCursor;

/// Backing storage for a ROOT file.
///
/// `Path` re-opens the file for every extraction call, so a `RootFile` holds
/// no open handle between calls; `Owned` is used for `from_bytes()` and testing.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// File on disk.
    Path(PathBuf),
    /// File bytes held in memory.
    Owned(Arc<[u8]>),
}

impl DataSource {
    /// Open a fresh reader positioned at offset 0.
    pub fn open(&self) -> Result<StreamCursor<SourceReader<'_>>> {
        let reader = match self {
            DataSource::Path(path) => SourceReader::File(BufReader::new(File::open(path)?)),
            DataSource::Owned(bytes) => SourceReader::Memory(Cursor::new(&bytes[..])),
        };
        Ok(StreamCursor::new(reader))
    }

    /// Path of the file, if disk backed.
    pub fn path(&self) -> Option<&Path> {
        match self {
            DataSource::Path(p) => Some(p),
            DataSource::Owned(_) => None,
        }
    }
}

/// Reader produced by [`DataSource::open`].
pub enum SourceReader<'a> {
    /// Buffered file handle.
    File(BufReader<File>),
    /// Cursor over owned bytes.
    Memory(Cursor<&'a [u8]>),
}

impl Read for SourceReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            SourceReader::File(f) => f.read(buf),
            SourceReader::Memory(c) => c.read(buf),
        }
    }
}

impl Seek for SourceReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            SourceReader::File(f) => f.seek(pos),
            SourceReader::Memory(c) => c.seek(pos),
        }
    }
}
