//! TFile header parsing and top-level ROOT file interface.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use crate::datasource::DataSource;
use crate::directory::{DirectoryNode, KeyDirectory};
use crate::error::{Result, RootError};
use crate::histogram::BinPars;
use crate::key::{KeyBuffer, ObjectKind};
use crate::objects::{EntryQuery, th1, ttree};
use crate::stream::StreamCursor;
use crate::streamer::SchemaRegistry;
use crate::tree::{LeafInfo, LeafValue};

const ROOT_MAGIC: &[u8; 4] = b"root";

/// Reader limits and checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Keys whose decompressed object exceeds this many bytes are dropped
    /// during the scan. Default: 1 GiB.
    pub max_object_bytes: u64,
    /// Verify the XXH64 checksum of LZ4 blocks. Default: true.
    pub verify_checksums: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { max_object_bytes: 1 << 30, verify_checksums: true }
    }
}

/// Parsed ROOT file header.
///
/// ```text
/// offset  size  field            (small file, version < 1000000)
///    0      4   magic "root"
///    4      4   fVersion
///    8      4   fBEGIN
///   12      4   fEND             (8 bytes in large files)
///   16      4   fSeekFree        (8 bytes in large files)
///   20      4   fNbytesFree
///   24      4   nfree
///   28      4   fNbytesName
///   32      1   fUnits
///   33      4   fCompress
///   37      4   fSeekInfo        (8 bytes in large files)
///   41      4   fNbytesInfo
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// File format version (`fVersion`).
    pub version: u32,
    /// Offset of the first key record.
    pub begin: u64,
    /// Offset of the first free byte at the end of the file.
    pub end: u64,
    /// Offset of the free-segments record.
    pub seek_free: u64,
    /// Size of the free-segments record.
    pub free_bytes: u32,
    /// Number of free segments.
    pub free_records: u32,
    /// Size of the file's own `TKey` + `TNamed` record.
    pub named_bytes: u32,
    /// Width of file pointers in bytes.
    pub pointer_bytes: u8,
    /// Compression setting (`100 * algorithm + level`); 0 when uncompressed.
    pub compression: u32,
    /// Offset of the `StreamerInfo` record.
    pub seek_info: u64,
    /// Size of the `StreamerInfo` record.
    pub info_bytes: u32,
}

impl FileInfo {
    /// Whether the file uses 64-bit seek pointers.
    pub fn is_large(&self) -> bool {
        self.version >= 1_000_000
    }

    fn read<R: Read + Seek>(c: &mut StreamCursor<R>) -> Result<Self> {
        if c.stream_len()? < ROOT_MAGIC.len() as u64 {
            return Err(RootError::BadMagic);
        }
        c.seek(0)?;
        if c.read_bytes(4)? != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }

        let version: u32 = c.read()?;
        let large = version >= 1_000_000;
        let begin = c.read::<u32>()? as u64;
        let (end, seek_free) = if large {
            (c.read::<u64>()?, c.read::<u64>()?)
        } else {
            (c.read::<u32>()? as u64, c.read::<u32>()? as u64)
        };
        let free_bytes = c.read()?;
        let free_records = c.read()?;
        let named_bytes = c.read()?;
        let pointer_bytes = c.read()?;
        let compression = c.read::<i32>()?.max(0) as u32;
        let seek_info = if large { c.read::<u64>()? } else { c.read::<u32>()? as u64 };
        let info_bytes = c.read()?;

        Ok(FileInfo {
            version,
            begin,
            end,
            seek_free,
            free_bytes,
            free_records,
            named_bytes,
            pointer_bytes,
            compression,
            seek_info,
            info_bytes,
        })
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File format version: {}", self.version)?;
        writeln!(f, "FREE data record size: {} bytes", self.free_bytes)?;
        writeln!(f, "Number of free data records: {}", self.free_records)?;
        writeln!(f, "TNamed size: {} bytes", self.named_bytes)?;
        writeln!(f, "Size of file pointers: {} bytes", self.pointer_bytes)?;
        writeln!(f, "Compression level and algorithm: {}", self.compression)?;
        write!(f, "Size of TStreamerInfo record: {} bytes", self.info_bytes)
    }
}

/// A ROOT file opened for reading histograms and trees.
///
/// Opening scans every key record once and decodes the file's streamer
/// info; afterwards the handle is immutable. Each read call opens its own
/// reader on the underlying file, so no file handle is kept between calls.
///
/// Opening fails only on the file header: data without the `root` magic
/// gives [`RootError::BadMagic`] and a header cut short gives
/// [`RootError::Io`]. Damage past the header never fails the open; the
/// scan stops at the first bad key record and the listings hold what was
/// read up to there.
///
/// The plain read methods never fail: problems are logged and produce an
/// empty result. The `try_*` variants return the error instead.
#[derive(Debug)]
pub struct RootFile {
    source: DataSource,
    config: ReaderConfig,
    info: FileInfo,
    keys: KeyDirectory,
    schemas: SchemaRegistry,
    bin_counts: BTreeMap<String, usize>,
    entry_counts: BTreeMap<String, u64>,
}

impl RootFile {
    /// Open and scan a ROOT file on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Open and scan a ROOT file on disk with explicit limits.
    pub fn open_with_config(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self> {
        Self::from_source(DataSource::Path(path.as_ref().to_path_buf()), config)
    }

    /// Scan a ROOT file held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_config(data, ReaderConfig::default())
    }

    /// Scan a ROOT file held in memory with explicit limits.
    pub fn from_bytes_with_config(data: Vec<u8>, config: ReaderConfig) -> Result<Self> {
        Self::from_source(DataSource::Owned(Arc::from(data)), config)
    }

    fn from_source(source: DataSource, config: ReaderConfig) -> Result<Self> {
        let mut c = source.open()?;
        let info = FileInfo::read(&mut c)?;
        let keys = KeyDirectory::scan(&mut c, info.begin, info.end, &config);

        let mut schemas = SchemaRegistry::new();
        for kb in keys.streamer_infos() {
            let parsed = kb
                .read_payload(&mut c, config.verify_checksums)
                .and_then(|payload| schemas.parse_streamer_list(&payload, kb.key_len));
            match parsed {
                Ok(n) => log::debug!("{} class layouts from streamer info", n),
                Err(e) => log::warn!("ignoring unreadable streamer info: {}", e),
            }
        }
        if !keys.histograms().is_empty() {
            schemas.install_histogram_fallbacks();
        }
        if !keys.trees().is_empty() {
            schemas.install_tree_fallbacks();
        }

        let mut bin_counts = BTreeMap::new();
        for (name, kb) in keys.histograms() {
            let count = kb
                .read_payload(&mut c, config.verify_checksums)
                .and_then(|payload| th1::read_bin_count(&payload, &schemas));
            match count {
                Ok(n) => {
                    bin_counts.insert(name.clone(), n);
                }
                Err(e) => log::warn!("cannot read bin count of {}: {}", name, e),
            }
        }
        let mut entry_counts = BTreeMap::new();
        for (name, kb) in keys.trees() {
            let count = kb.read_payload(&mut c, config.verify_checksums).and_then(|payload| {
                ttree::read_entry_count(&payload, kb.kind == ObjectKind::NTuple, &schemas)
            });
            match count {
                Ok(n) => {
                    entry_counts.insert(name.clone(), n);
                }
                Err(e) => log::warn!("cannot read entry count of {}: {}", name, e),
            }
        }

        drop(c);
        Ok(Self { source, config, info, keys, schemas, bin_counts, entry_counts })
    }

    /// Header fields of the file.
    pub fn file_info(&self) -> &FileInfo {
        &self.info
    }

    /// Limits the file was opened with.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Path of the file, if it was opened from disk.
    pub fn path(&self) -> Option<&Path> {
        self.source.path()
    }

    /// All retained keys.
    pub fn keys(&self) -> &KeyDirectory {
        &self.keys
    }

    /// Class layouts in use.
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Histogram names as `path;cycle`.
    pub fn list_histograms(&self) -> Vec<String> {
        self.keys.histograms().keys().cloned().collect()
    }

    /// Tree and n-tuple paths.
    pub fn list_trees(&self) -> Vec<String> {
        self.keys.trees().keys().cloned().collect()
    }

    /// Histograms arranged by sub-directory.
    pub fn histogram_directory(&self) -> DirectoryNode {
        DirectoryNode::from_paths(self.keys.histograms().keys().map(String::as_str))
    }

    /// Trees arranged by sub-directory.
    pub fn tree_directory(&self) -> DirectoryNode {
        DirectoryNode::from_paths(self.keys.trees().keys().map(String::as_str))
    }

    /// Number of bins of histogram `name` at `cycle`, under- and overflow
    /// included; 0 if unknown.
    pub fn histogram_bin_count(&self, name: &str, cycle: u16) -> usize {
        self.bin_counts.get(&format!("{};{}", name, cycle)).copied().unwrap_or(0)
    }

    /// Number of rows of `tree`; 0 if unknown.
    pub fn tree_entry_count(&self, tree: &str) -> usize {
        self.entry_counts.get(tree).map_or(0, |&n| n as usize)
    }

    /// All bins of histogram `name` at `cycle`, or an empty vector.
    pub fn read_histogram(&self, name: &str, cycle: u16) -> Vec<BinPars> {
        self.try_read_histogram(name, cycle).unwrap_or_else(|e| {
            log::warn!("cannot read histogram {};{}: {}", name, cycle, e);
            Vec::new()
        })
    }

    /// All bins of histogram `name` at `cycle`.
    pub fn try_read_histogram(&self, name: &str, cycle: u16) -> Result<Vec<BinPars>> {
        let kb = self
            .keys
            .histogram(name, cycle)
            .ok_or_else(|| RootError::KeyNotFound(format!("{};{}", name, cycle)))?;
        let ObjectKind::Histogram(content_type) = kb.kind else {
            return Err(RootError::KeyNotFound(format!("{};{}", name, cycle)));
        };
        let payload = self.payload(kb)?;
        th1::read_bins(&payload, content_type, &self.schemas)
    }

    /// Leaves of all top-level branches of `tree`, or an empty vector.
    pub fn list_leaves(&self, tree: &str) -> Vec<LeafInfo> {
        self.try_list_leaves(tree).unwrap_or_else(|e| {
            log::warn!("cannot list leaves of {}: {}", tree, e);
            Vec::new()
        })
    }

    /// Leaves of all top-level branches of `tree`.
    pub fn try_list_leaves(&self, tree: &str) -> Result<Vec<LeafInfo>> {
        let kb = self.tree_key(tree)?;
        let payload = self.payload(kb)?;
        ttree::read_leaves(&payload, kb.key_len, kb.kind == ObjectKind::NTuple, &self.schemas)
    }

    /// Up to `max_rows` values of slot `element` of `branch:leaf` in
    /// `tree`, converted to `T`; empty if anything is missing or broken.
    pub fn list_entries<T: LeafValue>(
        &self,
        tree: &str,
        branch: &str,
        leaf: &str,
        element: usize,
        max_rows: usize,
    ) -> Vec<T> {
        self.try_list_entries(tree, branch, leaf, element, max_rows).unwrap_or_else(|e| {
            log::warn!("cannot read {}:{} of {}: {}", branch, leaf, tree, e);
            Vec::new()
        })
    }

    /// Fallible form of [`RootFile::list_entries`].
    ///
    /// Unknown branches, leaves and out-of-range elements give an empty
    /// result; baskets that cannot be found or read are skipped.
    pub fn try_list_entries<T: LeafValue>(
        &self,
        tree: &str,
        branch: &str,
        leaf: &str,
        element: usize,
        max_rows: usize,
    ) -> Result<Vec<T>> {
        let kb = self.tree_key(tree)?;
        let mut c = self.source.open()?;
        let payload = kb.read_payload(&mut c, self.config.verify_checksums)?;
        let query = EntryQuery { branch, leaf, element, max_rows };
        let verify = self.config.verify_checksums;
        ttree::read_entries(
            &payload,
            kb.key_len,
            kb.kind == ObjectKind::NTuple,
            &self.schemas,
            &query,
            |seek| {
                let basket = self.keys.basket(seek)?;
                basket
                    .read_payload(&mut c, verify)
                    .map_err(|e| log::warn!("cannot read basket at {}: {}", seek, e))
                    .ok()
            },
        )
    }

    fn tree_key(&self, tree: &str) -> Result<&KeyBuffer> {
        self.keys.tree(tree).ok_or_else(|| RootError::KeyNotFound(tree.to_string()))
    }

    /// Read and decompress the payload of `kb`.
    pub(crate) fn payload(&self, kb: &KeyBuffer) -> Result<Vec<u8>> {
        let mut c = self.source.open()?;
        kb.read_payload(&mut c, self.config.verify_checksums)
    }
}
