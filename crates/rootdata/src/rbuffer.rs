//! Binary reader for ROOT's big-endian serialization format.
//!
//! [`RBuffer`] walks a materialized (decompressed) object payload. It also
//! carries the versioned-object primitives every ROOT streamer is built from:
//! byte-count/version headers, `TObject`/`TNamed` headers and `TString`s.

use crate::error::{Result, RootError};

/// ROOT flags a leading byte count by setting this bit in the first word.
pub(crate) const K_BYTE_COUNT_MASK: u32 = 0x4000_0000;

/// `TObject::kIsReferenced`: a 2-byte process-ID follows the `TObject` header.
const K_IS_REFERENCED: u32 = 1 << 4;

/// A fixed-width value stored most-significant byte first.
pub trait BigEndian: Sized {
    /// Width in bytes.
    const SIZE: usize;

    /// Decode from exactly `SIZE` bytes.
    fn from_be_slice(b: &[u8]) -> Self;
}

macro_rules! impl_big_endian {
    ($($t:ty),* $(,)?) => {
        $(
            impl BigEndian for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                #[inline]
                fn from_be_slice(b: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(&b[..Self::SIZE]);
                    <$t>::from_be_bytes(raw)
                }
            }
        )*
    };
}

impl_big_endian!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// A cursor-based reader over a byte slice, using ROOT's big-endian conventions.
pub struct RBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RBuffer<'a> {
    /// Create a new reader over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Total length of underlying buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remaining bytes from current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Set read position absolutely.
    ///
    /// Positions past the end are rejected so a corrupt byte count cannot
    /// park the cursor outside the buffer.
    pub fn set_pos(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(RootError::BufferUnderflow {
                offset: self.pos,
                need: pos - self.pos.min(pos),
                have: self.remaining(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Skip `n` bytes forward.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read a sub-slice of `n` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read one big-endian value of type `T`.
    #[inline]
    pub fn read<T: BigEndian>(&mut self) -> Result<T> {
        let b = self.read_bytes(T::SIZE)?;
        Ok(T::from_be_slice(b))
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read()
    }

    /// Read a one-byte boolean.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a big-endian u16.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read()
    }

    /// Read a big-endian i16.
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read()
    }

    /// Read a big-endian u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read()
    }

    /// Read a big-endian i32.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read()
    }

    /// Read a big-endian i64.
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read()
    }

    /// Read a big-endian f64.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read()
    }

    /// Read a ROOT-encoded string (`TString`).
    ///
    /// Format: length byte (if < 255), or 255 + u32 length, then UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_string_len()?;
        if len == 0 {
            return Ok(String::new());
        }
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Skip a `TString` without decoding it.
    pub fn skip_string(&mut self) -> Result<()> {
        let len = self.read_string_len()?;
        self.skip(len)
    }

    /// Read a NUL-terminated C string (class names in object headers).
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let len = rest.iter().position(|&b| b == 0).ok_or(RootError::BufferUnderflow {
            offset: self.pos,
            need: rest.len() + 1,
            have: rest.len(),
        })?;
        let s = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(s)
    }

    /// Read a ROOT streamer version header.
    ///
    /// Returns `(version, end_pos)` where `end_pos` is the absolute buffer
    /// position where this streamed object ends (`None` if no byte-count header).
    ///
    /// ROOT uses `kByteCountMask = 0x4000_0000` on the first u32 to signal that
    /// a byte count is present. The byte count spans from right after the u32
    /// to the end of the object (i.e. it includes the version u16).
    pub fn read_version(&mut self) -> Result<(u16, Option<usize>)> {
        let start = self.pos;
        let raw = self.read_u32()?;
        if raw & K_BYTE_COUNT_MASK != 0 {
            let byte_count = (raw & !K_BYTE_COUNT_MASK) as usize;
            let version = self.read_u16()?;
            let end_pos = start + 4 + byte_count;
            if end_pos > self.data.len() {
                return Err(RootError::BufferUnderflow {
                    offset: start,
                    need: 4 + byte_count,
                    have: self.data.len() - start,
                });
            }
            Ok((version, Some(end_pos)))
        } else {
            // No byte count: the first two bytes are the version.
            let version = (raw >> 16) as u16;
            self.pos -= 2;
            Ok((version, None))
        }
    }

    /// Read a version header that must carry a byte count; returns the end position.
    pub fn read_counted_version(&mut self, what: &str) -> Result<(u16, usize)> {
        let at = self.pos;
        match self.read_version()? {
            (version, Some(end)) => Ok((version, end)),
            (_, None) => Err(RootError::Deserialization(format!(
                "{} at {} has no byte count",
                what, at
            ))),
        }
    }

    /// Jump over a complete versioned sub-object.
    ///
    /// With a byte count the cursor moves to the end of the object. Without
    /// one the object is a bare four-byte header: this is how an empty
    /// `TArray` member (element count 0) looks on disk.
    pub fn skip_versioned(&mut self) -> Result<()> {
        match self.read_version()? {
            (_, Some(end)) => self.set_pos(end),
            (_, None) => self.skip(2),
        }
    }

    /// Read a `TObject` header: fUniqueID (u32) + fBits (u32).
    pub fn read_tobject(&mut self) -> Result<(u32, u32)> {
        let _ver = self.read_u16()?; // TObject version
        let unique_id = self.read_u32()?;
        let bits = self.read_u32()?;
        if bits & K_IS_REFERENCED != 0 {
            // pidf
            self.skip(2)?;
        }
        Ok((unique_id, bits))
    }

    /// Read a `TNamed`: TObject + fName + fTitle.
    pub fn read_tnamed(&mut self) -> Result<(String, String)> {
        let (_ver, _end) = self.read_version()?;
        self.read_tobject()?;
        let name = self.read_string()?;
        let title = self.read_string()?;
        Ok((name, title))
    }

    // ── internal ────────────────────────────────────────────────

    fn read_string_len(&mut self) -> Result<usize> {
        let first = self.read_u8()?;
        Ok(if first == 255 { self.read_u32()? as usize } else { first as usize })
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos.checked_add(n).map_or(true, |end| end > self.data.len()) {
            return Err(RootError::BufferUnderflow {
                offset: self.pos,
                need: n,
                have: self.data.len().saturating_sub(self.pos),
            });
        }
        Ok(())
    }
}
