//! Key directory: a linear scan over the key records of a ROOT file.
//!
//! Every object ROOT writes is a key record (`TKey` header + payload) laid
//! out back to back between `fBEGIN` and `fEND`, with deleted records
//! marked by a negative length. Walking them directly finds objects in all
//! sub-directories without decoding any `TDirectory` key lists.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};

use crate::decompress::BLOCK_HEADER_LEN;
use crate::error::{Result, RootError};
use crate::file::ReaderConfig;
use crate::key::{Key, KeyBuffer, ObjectKind};
use crate::stream::StreamCursor;

/// A sub-directory found during the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// Directory name.
    pub name: String,
    /// Key offset of the parent folder; the top directory is `fBEGIN`.
    pub parent: u64,
}

/// All retained keys of a file, classified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyDirectory {
    top: u64,
    folders: BTreeMap<u64, Folder>,
    histograms: BTreeMap<String, KeyBuffer>,
    trees: BTreeMap<String, KeyBuffer>,
    baskets: HashMap<u64, KeyBuffer>,
    streamer_infos: Vec<KeyBuffer>,
}

impl KeyDirectory {
    /// Scan the key records in `[begin, end)`.
    ///
    /// The scan stops at a zero record length, at `end`, or at the first
    /// record that cannot be read; whatever was found before is kept.
    pub fn scan<R: Read + Seek>(
        c: &mut StreamCursor<R>,
        begin: u64,
        end: u64,
        config: &ReaderConfig,
    ) -> Self {
        let mut dir = KeyDirectory { top: begin, ..Default::default() };
        let file_len = match c.stream_len() {
            Ok(len) => len,
            Err(e) => {
                log::warn!("cannot determine file length: {}", e);
                return dir;
            }
        };
        let end = end.min(file_len);

        let mut pos = begin;
        while pos < end {
            match dir.scan_record(c, pos, file_len, config) {
                Ok(Some(next)) => pos = next,
                Ok(None) => break,
                Err(e) => {
                    log::warn!("stopping key scan at offset {}: {}", pos, e);
                    break;
                }
            }
        }
        log::debug!(
            "scanned keys: {} histograms, {} trees, {} baskets, {} folders",
            dir.histograms.len(),
            dir.trees.len(),
            dir.baskets.len(),
            dir.folders.len()
        );
        dir
    }

    /// Read the record at `pos`; returns the offset of the next record.
    fn scan_record<R: Read + Seek>(
        &mut self,
        c: &mut StreamCursor<R>,
        pos: u64,
        file_len: u64,
        config: &ReaderConfig,
    ) -> Result<Option<u64>> {
        c.seek(pos)?;
        let key = Key::read(c)?;
        if key.n_bytes == 0 {
            return Ok(None);
        }
        if key.n_bytes < 0 {
            return Ok(Some(pos + key.n_bytes.unsigned_abs() as u64));
        }
        let next = pos + key.n_bytes as u64;
        if key.key_len as i64 > key.n_bytes as i64 || (key.key_len as u64) < c.pos() - pos {
            return Err(RootError::MalformedKey {
                offset: pos,
                reason: format!("key length {} inconsistent with record", key.key_len),
            });
        }
        if next > file_len {
            return Err(RootError::MalformedKey {
                offset: pos,
                reason: format!("record of {} bytes runs past end of file", key.n_bytes),
            });
        }

        if let Some(kind) = ObjectKind::classify(&key.class_name, &key.name) {
            if let Err(e) = self.add(c, &key, kind, config) {
                log::warn!("dropping {} {} at offset {}: {}", key.class_name, key.name, pos, e);
            }
        }
        Ok(Some(next))
    }

    fn add<R: Read + Seek>(
        &mut self,
        c: &mut StreamCursor<R>,
        key: &Key,
        kind: ObjectKind,
        config: &ReaderConfig,
    ) -> Result<()> {
        if kind == ObjectKind::Directory {
            let parent = self.folder_of(key.seek_pdir);
            self.folders.insert(key.seek_key, Folder { name: key.name.clone(), parent });
            return Ok(());
        }
        if key.obj_len as u64 > config.max_object_bytes {
            return Err(RootError::MalformedKey {
                offset: key.seek_key,
                reason: format!(
                    "object of {} bytes exceeds the {} byte limit",
                    key.obj_len, config.max_object_bytes
                ),
            });
        }

        let buffer = if key.is_compressed() {
            if key.data_len() < BLOCK_HEADER_LEN {
                return Err(RootError::MalformedKey {
                    offset: key.seek_key,
                    reason: "compressed payload shorter than its block header".into(),
                });
            }
            c.seek(key.seek_key + key.key_len as u64)?;
            let header = c.read_bytes(BLOCK_HEADER_LEN)?;
            KeyBuffer::new(key, kind, Some(&header))?
        } else {
            KeyBuffer::new(key, kind, None)?
        };

        match kind {
            ObjectKind::Basket => {
                self.baskets.insert(key.seek_key, buffer);
            }
            ObjectKind::StreamerInfo => self.streamer_infos.push(buffer),
            ObjectKind::Tree | ObjectKind::NTuple => {
                let path = self.path_of(key.seek_pdir, &key.name);
                match self.trees.get(&path) {
                    Some(existing) if existing.cycle >= buffer.cycle => {
                        log::debug!("keeping cycle {} of tree {}", existing.cycle, path);
                    }
                    _ => {
                        self.trees.insert(path, buffer);
                    }
                }
            }
            ObjectKind::Histogram(_) => {
                let path = self.path_of(key.seek_pdir, &key.name);
                self.histograms.insert(format!("{};{}", path, key.cycle), buffer);
            }
            ObjectKind::Directory => {}
        }
        Ok(())
    }

    /// Folder id for a parent-directory pointer; unknown pointers map to the top.
    fn folder_of(&self, seek_pdir: u64) -> u64 {
        if self.folders.contains_key(&seek_pdir) { seek_pdir } else { self.top }
    }

    /// `dir/sub/name` for an object in the folder at `seek_pdir`.
    fn path_of(&self, seek_pdir: u64, name: &str) -> String {
        let mut parts = vec![name];
        let mut id = self.folder_of(seek_pdir);
        // Bounded walk: a corrupt file could link folders in a loop.
        for _ in 0..self.folders.len() {
            match self.folders.get(&id) {
                Some(folder) => {
                    parts.push(&folder.name);
                    id = folder.parent;
                }
                None => break,
            }
        }
        parts.reverse();
        parts.join("/")
    }

    /// Histograms by `path;cycle`.
    pub fn histograms(&self) -> &BTreeMap<String, KeyBuffer> {
        &self.histograms
    }

    /// Trees and n-tuples by path, highest cycle only.
    pub fn trees(&self) -> &BTreeMap<String, KeyBuffer> {
        &self.trees
    }

    /// Basket key at file offset `seek`.
    pub fn basket(&self, seek: u64) -> Option<&KeyBuffer> {
        self.baskets.get(&seek)
    }

    /// Number of basket keys.
    pub fn basket_count(&self) -> usize {
        self.baskets.len()
    }

    /// `StreamerInfo` records in file order.
    pub fn streamer_infos(&self) -> &[KeyBuffer] {
        &self.streamer_infos
    }

    /// Sub-directories by key offset.
    pub fn folders(&self) -> &BTreeMap<u64, Folder> {
        &self.folders
    }

    /// Histogram `name` (a path) at `cycle`.
    pub fn histogram(&self, name: &str, cycle: u16) -> Option<&KeyBuffer> {
        self.histograms.get(&format!("{};{}", name, cycle))
    }

    /// Tree or n-tuple at `path`.
    pub fn tree(&self, path: &str) -> Option<&KeyBuffer> {
        self.trees.get(path)
    }
}

/// A directory level of the object hierarchy, as shown to users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    /// Directory name; empty for the top level.
    pub name: String,
    /// Sub-directories holding at least one object.
    pub children: Vec<DirectoryNode>,
    /// Full object names (as accepted by the read calls) in this directory.
    pub content: Vec<String>,
}

impl DirectoryNode {
    /// Build the hierarchy from `dir/sub/name` paths.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut root = DirectoryNode::default();
        for path in paths {
            let mut node = &mut root;
            let mut segments: Vec<&str> = path.split('/').collect();
            segments.pop();
            for segment in segments {
                let i = match node.children.iter().position(|c| c.name == segment) {
                    Some(i) => i,
                    None => {
                        node.children
                            .push(DirectoryNode { name: segment.to_string(), ..Default::default() });
                        node.children.len() - 1
                    }
                };
                node = &mut node.children[i];
            }
            node.content.push(path.to_string());
        }
        root
    }

    /// Whether the hierarchy holds no object.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.children.iter().all(DirectoryNode::is_empty)
    }
}
