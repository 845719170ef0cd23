//! TTree / TBranch / TLeaf traversal.
//!
//! A tree payload is walked with the `TTree` and `TBranch` layouts:
//! `fBranches` is a `TObjArray` of polymorphic `TBranch` /
//! `TBranchElement` objects, each carrying its own `fLeaves` array and the
//! per-basket tables (`fBasketEntry`, `fBasketSeek`). Leaf values live in
//! separate `TBasket` keys looked up by file offset.

use crate::class_ref::ClassRefs;
use crate::error::{Result, RootError};
use crate::navigator::{Counters, advance_to, skip_member};
use crate::rbuffer::RBuffer;
use crate::streamer::{SchemaField, SchemaRegistry};
use crate::tree::{ContentType, LeafInfo, LeafValue};

/// Which leaf values to extract.
#[derive(Debug, Clone, Copy)]
pub struct EntryQuery<'a> {
    /// Branch name.
    pub branch: &'a str,
    /// Leaf name within the branch.
    pub leaf: &'a str,
    /// Array slot for fixed-size array leaves.
    pub element: usize,
    /// Maximum number of values to return.
    pub max_rows: usize,
}

/// Read `fEntries`, the number of rows of the tree.
pub fn read_entry_count(payload: &[u8], ntuple: bool, schemas: &SchemaRegistry) -> Result<u64> {
    let ttree = schemas.require("TTree")?;
    let mut r = RBuffer::new(payload);
    let mut counters = Counters::new();
    if ntuple {
        r.read_version()?; // TNtuple(D)
    }
    r.read_version()?; // TTree
    advance_to(&mut r, "TTree", ttree, None, "fEntries", &mut counters)?;
    Ok(r.read_i64()?.max(0) as u64)
}

/// List the leaves of every top-level branch.
pub fn read_leaves(
    payload: &[u8],
    key_len: usize,
    ntuple: bool,
    schemas: &SchemaRegistry,
) -> Result<Vec<LeafInfo>> {
    let mut walk = TreeWalk::open(payload, key_len, ntuple, schemas)?;
    let mut leaves = Vec::new();

    let (n_branches, lowb) = open_obj_array(&mut walk.r)?.0;
    for i in 0..n_branches {
        let Some((branch, end)) = walk.enter_branch(i >= lowb)? else {
            continue;
        };

        let (n_leaves, leaf_lowb) = open_obj_array(&mut walk.r)?.0;
        for j in 0..n_leaves {
            let Some((class, leaf_end)) = walk.next_element()? else {
                continue;
            };
            walk.r.read_version()?; // TLeaf?
            let content_type = class
                .as_bytes()
                .last()
                .and_then(|&c| ContentType::from_leaf_suffix(c))
                .filter(|_| j >= leaf_lowb && class.len() == 6 && class.starts_with("TLeaf"));
            if let Some(content_type) = content_type {
                let leaf = read_leaf_header(&mut walk.r)?;
                if leaf.size != content_type.byte_width() {
                    log::debug!("leaf {} of type {} has size {}", leaf.name, class, leaf.size);
                }
                leaves.push(LeafInfo {
                    branch: branch.clone(),
                    leaf: leaf.name,
                    content_type,
                    signed: leaf.signed,
                    elements: leaf.len,
                });
            }
            walk.r.set_pos(leaf_end)?;
        }
        walk.r.set_pos(end)?;
    }
    Ok(leaves)
}

/// Extract the values of one leaf slot.
///
/// `fetch_basket` returns the decompressed payload of the `TBasket` key at
/// a file offset, or `None` when it is unavailable; such baskets are
/// skipped.
pub fn read_entries<T, F>(
    payload: &[u8],
    key_len: usize,
    ntuple: bool,
    schemas: &SchemaRegistry,
    query: &EntryQuery,
    mut fetch_basket: F,
) -> Result<Vec<T>>
where
    T: LeafValue,
    F: FnMut(u64) -> Option<Vec<u8>>,
{
    let mut walk = TreeWalk::open(payload, key_len, ntuple, schemas)?;
    let entries = walk.entries as usize;

    let (n_branches, lowb) = open_obj_array(&mut walk.r)?.0;
    for i in 0..n_branches {
        let Some((branch, end)) = walk.enter_branch(i >= lowb)? else {
            continue;
        };
        let wanted = branch == query.branch;

        // Leaves of other branches are still walked: they register class tags.
        let ((n_leaves, leaf_lowb), leaves_end) = open_obj_array(&mut walk.r)?;
        let mut layout: Option<LeafLayout> = None;
        let mut stride = 0usize;
        for j in 0..n_leaves {
            let Some((class, leaf_end)) = walk.next_element()? else {
                continue;
            };
            walk.r.read_version()?; // TLeaf?
            if wanted && j >= leaf_lowb && class.starts_with("TLeaf") {
                let leaf = read_leaf_header(&mut walk.r)?;
                let is_target = class.len() == 6 && leaf.name == query.leaf;
                let offset = stride;
                stride = leaf
                    .len
                    .checked_mul(leaf.size)
                    .and_then(|bytes| stride.checked_add(bytes))
                    .ok_or_else(|| {
                        RootError::Deserialization(format!(
                            "leaf {} with {} x {} bytes overflows the row size",
                            leaf.name, leaf.len, leaf.size
                        ))
                    })?;
                if is_target {
                    let content_type = class
                        .as_bytes()
                        .last()
                        .and_then(|&c| ContentType::from_leaf_suffix(c));
                    layout = content_type.map(|content_type| LeafLayout {
                        offset,
                        size: leaf.size,
                        content: stride - offset,
                        content_type,
                        signed: leaf.signed,
                    });
                }
            }
            walk.r.set_pos(leaf_end)?;
        }
        let Some(layout) = layout.filter(|l| l.content > 0) else {
            walk.r.set_pos(end)?;
            continue;
        };

        let Some(slot) = query
            .element
            .checked_mul(layout.size)
            .filter(|&bytes| bytes < layout.content)
            .map(|bytes| layout.offset + bytes)
        else {
            log::debug!(
                "{} only has {} elements, slot {} requested",
                query.leaf,
                layout.content / layout.size.max(1),
                query.element
            );
            return Ok(Vec::new());
        };

        walk.r.set_pos(leaves_end)?;
        let seeks = walk.basket_seeks(query.max_rows)?;

        let mut values = Vec::with_capacity(entries.min(query.max_rows));
        for (n, seek) in seeks.into_iter().enumerate() {
            if values.len() >= query.max_rows {
                break;
            }
            let Some(basket) = fetch_basket(seek) else {
                log::debug!("fBasketSeek[{}] = {} not available", n, seek);
                continue;
            };
            let mut r = RBuffer::new(&basket);
            let mut row = 0;
            while row + stride <= basket.len() && values.len() < query.max_rows {
                r.set_pos(row + slot)?;
                values.push(layout.content_type.read_value(&mut r, layout.signed)?);
                row += stride;
            }
        }
        return Ok(values);
    }

    log::debug!("no leaf {}:{} in tree", query.branch, query.leaf);
    Ok(Vec::new())
}

/// Byte layout of the requested leaf within one row of its branch.
#[derive(Debug, Clone, Copy)]
struct LeafLayout {
    /// Offset of the leaf in the row.
    offset: usize,
    /// Bytes per element.
    size: usize,
    /// Bytes of all elements.
    content: usize,
    content_type: ContentType,
    signed: bool,
}

/// Common part of a `TLeaf` header.
struct LeafHeader {
    name: String,
    len: usize,
    size: usize,
    signed: bool,
}

/// Read a leaf from its `TLeaf` base; the subclass version is consumed.
fn read_leaf_header(r: &mut RBuffer) -> Result<LeafHeader> {
    r.read_version()?; // TLeaf
    let (name, _title) = r.read_tnamed()?;
    let len = r.read_i32()?.max(0) as usize; // fLen
    let size = r.read_i32()?.max(0) as usize; // fLenType
    r.skip(5)?; // fOffset, fIsRange
    let unsigned = r.read_bool()?; // fIsUnsigned
    Ok(LeafHeader { name, len, size, signed: !unsigned })
}

/// Open an inline `TObjArray` member: `((n, lower bound), end)`.
fn open_obj_array(r: &mut RBuffer) -> Result<((usize, usize), usize)> {
    let (_, end) = r.read_counted_version("TObjArray")?;
    r.read_tobject()?;
    r.skip_string()?; // fName
    let n = r.read_i32()?.max(0) as usize;
    let lowb = r.read_i32()?.max(0) as usize;
    Ok(((n, lowb), end))
}

/// Cursor state while walking one tree payload.
struct TreeWalk<'a> {
    r: RBuffer<'a>,
    refs: ClassRefs,
    tbranch: &'a [SchemaField],
    counters: Counters,
    entries: u64,
    /// `fWriteBasket` of the current branch.
    write_basket: usize,
}

impl<'a> TreeWalk<'a> {
    /// Position the cursor on `fBranches`.
    fn open(
        payload: &'a [u8],
        key_len: usize,
        ntuple: bool,
        schemas: &'a SchemaRegistry,
    ) -> Result<Self> {
        let ttree = schemas.require("TTree")?;
        let tbranch = schemas.require("TBranch")?;
        let mut r = RBuffer::new(payload);
        let mut counters = Counters::new();
        if ntuple {
            r.read_version()?; // TNtuple(D)
        }
        r.read_version()?; // TTree
        advance_to(&mut r, "TTree", ttree, None, "fEntries", &mut counters)?;
        let entries = r.read_i64()?.max(0) as u64;
        advance_to(&mut r, "TTree", ttree, Some("fEntries"), "fBranches", &mut counters)?;
        counters.clear();
        Ok(Self { r, refs: ClassRefs::new(key_len), tbranch, counters, entries, write_basket: 0 })
    }

    /// Header of the next collection element. Elements whose class tag
    /// cannot be resolved are skipped and read as `None`.
    fn next_element(&mut self) -> Result<Option<(String, usize)>> {
        match self.refs.read_element(&mut self.r)? {
            Some((class, end)) if class.is_empty() => {
                self.r.set_pos(end)?;
                Ok(None)
            }
            element => Ok(element),
        }
    }

    /// Read a branch up to its `fLeaves` array.
    ///
    /// Returns the branch name and end position, or `None` for null
    /// entries, branches of an unresolved class and slots below the
    /// array's lower bound.
    fn enter_branch(&mut self, in_bounds: bool) -> Result<Option<(String, usize)>> {
        let Some((class, end)) = self.next_element()? else {
            return Ok(None);
        };
        self.r.read_version()?; // TBranch or TBranchElement
        if !in_bounds {
            self.r.set_pos(end)?;
            return Ok(None);
        }
        if class == "TBranchElement" {
            self.r.read_version()?; // TBranch
        }
        self.counters.clear();
        advance_to(&mut self.r, "TBranch", self.tbranch, None, "TNamed", &mut self.counters)?;
        let (name, _title) = self.r.read_tnamed()?;
        advance_to(
            &mut self.r,
            "TBranch",
            self.tbranch,
            Some("TNamed"),
            "fWriteBasket",
            &mut self.counters,
        )?;
        self.write_basket = self.r.read_i32()?.max(0) as usize;
        advance_to(
            &mut self.r,
            "TBranch",
            self.tbranch,
            Some("fWriteBasket"),
            "fLeaves",
            &mut self.counters,
        )?;
        Ok(Some((name, end)))
    }

    /// File offsets of the baskets needed for `max_rows` rows; the cursor
    /// sits right after `fLeaves`.
    fn basket_seeks(&mut self, max_rows: usize) -> Result<Vec<u64>> {
        let tbranch = self.tbranch;
        let write_basket = self.write_basket;
        let max_baskets = self.counters.get("fMaxBaskets").copied().unwrap_or(0).max(0) as usize;
        let limit = i64::try_from(max_rows).unwrap_or(i64::MAX);

        advance_to(
            &mut self.r,
            "TBranch",
            tbranch,
            Some("fLeaves"),
            "fBasketEntry",
            &mut self.counters,
        )?;
        let entry_table = self.r.pos();
        self.r.skip(1)?;
        let mut n_baskets = write_basket;
        for i in 0..(write_basket + 1).min(max_baskets) {
            if self.r.read_i64()? > limit {
                n_baskets = i;
                break;
            }
        }

        self.r.set_pos(entry_table)?;
        skip_member(&mut self.r, "TBranch", tbranch, "fBasketEntry", &mut self.counters)?;
        advance_to(
            &mut self.r,
            "TBranch",
            tbranch,
            Some("fBasketEntry"),
            "fBasketSeek",
            &mut self.counters,
        )?;
        self.r.skip(1)?;
        let mut seeks = Vec::with_capacity(n_baskets);
        for _ in 0..n_baskets.min(max_baskets) {
            seeks.push(self.r.read_i64()? as u64);
        }
        Ok(seeks)
    }
}
