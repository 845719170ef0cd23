//! Big-endian cursor over a seekable file stream.
//!
//! Used for the directory scan, which hops from key to key through the file
//! without materializing it, and for pulling single payloads off disk.

use std::io::{Read, Seek, SeekFrom};

use crate::error::Result;
use crate::rbuffer::BigEndian;

/// Reader over any `Read + Seek` source that tracks its absolute position.
pub struct StreamCursor<R> {
    inner: R,
    pos: u64,
}

impl<R: Read + Seek> StreamCursor<R> {
    /// Wrap a reader positioned at offset 0.
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    /// Absolute position of the next read.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Move to an absolute file offset.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.pos = self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Total length of the stream; the position is left unchanged.
    pub fn stream_len(&mut self) -> Result<u64> {
        let len = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(self.pos))?;
        Ok(len)
    }

    /// Skip `n` bytes forward.
    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.seek(self.pos + n)
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        self.pos += n as u64;
        Ok(buf)
    }

    /// Read one big-endian value of type `T`.
    pub fn read<T: BigEndian>(&mut self) -> Result<T> {
        let mut buf = [0u8; 8];
        let b = &mut buf[..T::SIZE];
        self.inner.read_exact(b)?;
        self.pos += T::SIZE as u64;
        Ok(T::from_be_slice(b))
    }

    /// Read a ROOT string: one length byte, or `0xFF` followed by a u32 length.
    pub fn read_string(&mut self) -> Result<String> {
        let first: u8 = self.read()?;
        let len = if first == 255 { self.read::<u32>()? as usize } else { first as usize };
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
