//! ROOT compression block decompression (ZL = zlib, L4 = LZ4).
//!
//! ROOT writes compressed data as one or more 9-byte-header blocks:
//! ```text
//! bytes 0-1:  algorithm tag ("ZL", "L4", ...)
//! byte  2:    method (8 = deflate for ZL, LZ4 major version for L4)
//! bytes 3-5:  compressed size   (3-byte little-endian)
//! bytes 6-8:  uncompressed size (3-byte little-endian)
//! ```
//! The compressed payload immediately follows the 9-byte header. `L4`
//! payloads start with an 8-byte big-endian XXH64 checksum of the LZ4 data.

use crate::error::{Result, RootError};

/// Length of an RZip block header.
pub const BLOCK_HEADER_LEN: usize = 9;

/// Length of the XXH64 checksum in front of LZ4 block data.
pub const LZ4_CHECKSUM_LEN: usize = 8;

/// zlib's `Z_DEFLATED`.
const DEFLATE_METHOD: u8 = 8;
/// LZ4 major version recorded by ROOT in the method byte.
const LZ4_METHOD: u8 = 1;

/// Compression codec of a stored payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Stored as-is.
    None,
    /// zlib / deflate (`ZL`).
    Zlib,
    /// LZ4 block with XXH64 checksum (`L4`).
    Lz4,
}

/// A parsed RZip block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Codec named by the tag.
    pub compression: Compression,
    /// Compressed bytes following the header (checksum included for LZ4).
    pub compressed_len: usize,
    /// Bytes this block inflates to.
    pub uncompressed_len: usize,
}

impl BlockHeader {
    /// Parse the 9-byte header at the start of `b`.
    pub fn parse(b: &[u8]) -> Result<Self> {
        if b.len() < BLOCK_HEADER_LEN {
            return Err(RootError::BufferUnderflow {
                offset: 0,
                need: BLOCK_HEADER_LEN,
                have: b.len(),
            });
        }
        let tag = &b[0..2];
        let method = b[2];
        let compression = match (tag, method) {
            (b"ZL", DEFLATE_METHOD) => Compression::Zlib,
            (b"L4", LZ4_METHOD) => Compression::Lz4,
            (b"ZL", _) | (b"L4", _) => {
                return Err(RootError::Decompression(format!(
                    "unexpected method {} for {}",
                    method,
                    String::from_utf8_lossy(tag)
                )));
            }
            _ => {
                return Err(RootError::UnsupportedCompression(
                    String::from_utf8_lossy(tag).into_owned(),
                ));
            }
        };
        Ok(Self {
            compression,
            compressed_len: read_le24(&b[3..6]),
            uncompressed_len: read_le24(&b[6..9]),
        })
    }
}

/// Decompress ROOT-compressed data into `expected_len` bytes.
///
/// With `verify_checksums` the XXH64 checksum in front of every LZ4 block
/// is checked against the compressed bytes.
pub fn decompress(src: &[u8], expected_len: usize, verify_checksums: bool) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut offset = 0;

    while out.len() < expected_len && offset + BLOCK_HEADER_LEN <= src.len() {
        let header = BlockHeader::parse(&src[offset..])?;
        offset += BLOCK_HEADER_LEN;

        let end = offset + header.compressed_len;
        if end > src.len() {
            return Err(RootError::Decompression(format!(
                "compressed block claims {} bytes but only {} remain",
                header.compressed_len,
                src.len() - offset
            )));
        }
        if out.len() + header.uncompressed_len > expected_len {
            return Err(RootError::Decompression(format!(
                "block inflates past the declared {} bytes",
                expected_len
            )));
        }

        let compressed = &src[offset..end];
        let decompressed = match header.compression {
            Compression::Zlib => decompress_zlib(compressed, header.uncompressed_len)?,
            Compression::Lz4 => {
                decompress_lz4(compressed, header.uncompressed_len, verify_checksums)?
            }
            Compression::None => compressed.to_vec(),
        };

        if decompressed.len() != header.uncompressed_len {
            return Err(RootError::Decompression(format!(
                "expected {} uncompressed bytes, got {}",
                header.uncompressed_len,
                decompressed.len()
            )));
        }

        out.extend_from_slice(&decompressed);
        offset = end;
    }

    if out.len() != expected_len {
        return Err(RootError::Decompression(format!(
            "total decompressed length {} != expected {}",
            out.len(),
            expected_len
        )));
    }

    Ok(out)
}

fn decompress_zlib(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    let mut out = Vec::with_capacity(expected);
    // One extra byte lets an oversized stream show up as a length mismatch.
    ZlibDecoder::new(data)
        .take(expected as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| RootError::Decompression(format!("zlib: {}", e)))?;
    Ok(out)
}

fn decompress_lz4(data: &[u8], expected: usize, verify_checksum: bool) -> Result<Vec<u8>> {
    if data.len() < LZ4_CHECKSUM_LEN {
        return Err(RootError::Decompression("LZ4 block too small for checksum header".into()));
    }
    let (checksum, lz4_data) = data.split_at(LZ4_CHECKSUM_LEN);
    if verify_checksum {
        let stored = u64::from_be_bytes([
            checksum[0], checksum[1], checksum[2], checksum[3], checksum[4], checksum[5],
            checksum[6], checksum[7],
        ]);
        let actual = xxhash_rust::xxh64::xxh64(lz4_data, 0);
        if stored != actual {
            return Err(RootError::Decompression(format!(
                "lz4 checksum mismatch: stored {:#018x}, computed {:#018x}",
                stored, actual
            )));
        }
    }
    lz4_flex::decompress(lz4_data, expected)
        .map_err(|e| RootError::Decompression(format!("lz4: {}", e)))
}

/// Read a 3-byte little-endian unsigned integer.
fn read_le24(b: &[u8]) -> usize {
    b[0] as usize | ((b[1] as usize) << 8) | ((b[2] as usize) << 16)
}
