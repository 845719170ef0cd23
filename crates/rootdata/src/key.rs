//! TKey parsing: the record header ROOT puts in front of every stored object.

use std::io::{Read, Seek};

use crate::decompress::{BLOCK_HEADER_LEN, BlockHeader, Compression, decompress};
use crate::error::{Result, RootError};
use crate::stream::StreamCursor;
use crate::tree::ContentType;

/// A parsed TKey record header.
#[derive(Debug, Clone)]
pub struct Key {
    /// Total number of bytes in the record (key header + stored object).
    /// Negative for a free (deleted) segment of that many bytes.
    pub n_bytes: i32,
    /// Version of key class.
    pub version: u16,
    /// Uncompressed object length.
    pub obj_len: u32,
    /// Length of the key header itself.
    pub key_len: u16,
    /// Cycle number (ROOT versioning within a directory).
    pub cycle: u16,
    /// Absolute position of this key in the file.
    pub seek_key: u64,
    /// Seek position of the directory the key belongs to.
    pub seek_pdir: u64,
    /// Class name of the stored object.
    pub class_name: String,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
}

impl Key {
    /// Read a TKey header from the stream at its current position.
    ///
    /// A free segment (`n_bytes <= 0`) stops after the length word; the
    /// remaining fields are left empty.
    pub fn read<R: Read + Seek>(c: &mut StreamCursor<R>) -> Result<Self> {
        let seek_key = c.pos();
        let n_bytes: i32 = c.read()?;
        if n_bytes <= 0 {
            return Ok(Key {
                n_bytes,
                version: 0,
                obj_len: 0,
                key_len: 0,
                cycle: 0,
                seek_key,
                seek_pdir: 0,
                class_name: String::new(),
                name: String::new(),
                title: String::new(),
            });
        }
        let version: u16 = c.read()?;
        let obj_len: u32 = c.read()?;
        let _datime: u32 = c.read()?;
        let key_len: u16 = c.read()?;
        let cycle: u16 = c.read()?;

        // fSeekKey is redundant with our own position.
        let seek_pdir = if version > 1000 {
            c.skip(8)?;
            c.read::<u64>()?
        } else {
            c.skip(4)?;
            c.read::<u32>()? as u64
        };

        let class_name = c.read_string()?;
        let name = c.read_string()?;
        let title = c.read_string()?;

        Ok(Key {
            n_bytes,
            version,
            obj_len,
            key_len,
            cycle,
            seek_key,
            seek_pdir,
            class_name,
            name,
            title,
        })
    }

    /// Bytes of stored object data following the key header.
    pub fn data_len(&self) -> usize {
        (self.n_bytes.max(0) as usize).saturating_sub(self.key_len as usize)
    }

    /// Whether the stored object is compressed.
    pub fn is_compressed(&self) -> bool {
        self.data_len() != self.obj_len as usize
    }
}

/// What a retained key holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// `TH1D`/`TH1F`/`TH1I`/`TH1S`/`TH1C`; the payload's bin content type.
    Histogram(ContentType),
    /// `TTree`.
    Tree,
    /// `TNtuple` or `TNtupleD`: a tree with an extra wrapper version.
    NTuple,
    /// `TBasket`: a block of raw tree column data.
    Basket,
    /// The `TList` named `StreamerInfo`.
    StreamerInfo,
    /// `TDirectory`/`TDirectoryFile`: a sub-directory.
    Directory,
}

impl ObjectKind {
    /// Classify a key by its class and object name; `None` for classes
    /// the reader does not handle.
    pub fn classify(class_name: &str, name: &str) -> Option<Self> {
        let bytes = class_name.as_bytes();
        if bytes.len() == 4 && class_name.starts_with("TH1") {
            return ContentType::from_histogram_suffix(bytes[3]).map(ObjectKind::Histogram);
        }
        match class_name {
            "TTree" => Some(ObjectKind::Tree),
            "TBasket" => Some(ObjectKind::Basket),
            "TList" if name == "StreamerInfo" => Some(ObjectKind::StreamerInfo),
            "TDirectory" | "TDirectoryFile" => Some(ObjectKind::Directory),
            c if c.starts_with("TNtuple") => Some(ObjectKind::NTuple),
            _ => None,
        }
    }

    /// Whether the kind is a tree or n-tuple.
    pub fn is_tree(self) -> bool {
        matches!(self, ObjectKind::Tree | ObjectKind::NTuple)
    }
}

/// Identity and physical location of one retained object.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBuffer {
    /// Kind of object stored.
    pub kind: ObjectKind,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
    /// Cycle number.
    pub cycle: u16,
    /// File offset of the key record.
    pub key_offset: u64,
    /// Length of the key header; class back-references count from the key start.
    pub key_len: usize,
    /// File offset of the stored object data (first RZip block if compressed).
    pub start: u64,
    /// Codec of the first block.
    pub compression: Compression,
    /// Stored bytes, RZip headers included.
    pub compressed_len: usize,
    /// Decompressed object length.
    pub uncompressed_len: usize,
}

impl KeyBuffer {
    /// Build a buffer descriptor for `key`.
    ///
    /// For compressed objects `first_block` is the leading RZip block header;
    /// its sizes are checked against the key's before it is trusted.
    pub fn new(key: &Key, kind: ObjectKind, first_block: Option<&[u8]>) -> Result<Self> {
        let data_len = key.data_len();
        let uncompressed_len = key.obj_len as usize;
        let compression = match first_block {
            None => Compression::None,
            Some(raw) => {
                let header = BlockHeader::parse(raw)?;
                let single = header.uncompressed_len == uncompressed_len;
                if header.compressed_len + BLOCK_HEADER_LEN > data_len
                    || header.uncompressed_len > uncompressed_len
                    || (single && header.compressed_len + BLOCK_HEADER_LEN != data_len)
                {
                    return Err(RootError::MalformedKey {
                        offset: key.seek_key,
                        reason: format!(
                            "block sizes {}/{} disagree with key sizes {}/{}",
                            header.compressed_len, header.uncompressed_len, data_len,
                            uncompressed_len
                        ),
                    });
                }
                header.compression
            }
        };

        Ok(Self {
            kind,
            name: key.name.clone(),
            title: key.title.clone(),
            cycle: key.cycle,
            key_offset: key.seek_key,
            key_len: key.key_len as usize,
            start: key.seek_key + key.key_len as u64,
            compression,
            compressed_len: data_len,
            uncompressed_len,
        })
    }

    /// Read the object payload from `c` and decompress it.
    pub fn read_payload<R: Read + Seek>(
        &self,
        c: &mut StreamCursor<R>,
        verify_checksums: bool,
    ) -> Result<Vec<u8>> {
        c.seek(self.start)?;
        let raw = c.read_bytes(self.compressed_len)?;
        match self.compression {
            Compression::None => Ok(raw),
            _ => decompress(&raw, self.uncompressed_len, verify_checksums),
        }
    }
}
