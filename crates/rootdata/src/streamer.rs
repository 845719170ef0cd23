//! Schema registry: per-class field layouts decoded from `TStreamerInfo`.
//!
//! ROOT stores a self-description of every streamed class in the
//! `StreamerInfo` key: a `TList` of `TStreamerInfo` objects, each holding a
//! `TObjArray` of `TStreamerElement`s in on-disk member order. Only the
//! element kind, name, size and (for counted arrays) the counter name are
//! kept, which is what [`crate::navigator::advance_to`] needs to walk over
//! members it does not decode.
//!
//! Files without a streamer record get built-in layouts for `TH1`, `TAxis`,
//! `TTree` and `TBranch`, taken from one ROOT 6 release.

use std::collections::HashMap;

use crate::class_ref::ClassRefs;
use crate::error::{Result, RootError};
use crate::rbuffer::RBuffer;

/// `TVirtualStreamerInfo::kCounter`: an int member used as an array length.
const K_COUNTER: i32 = 6;
/// `TVirtualStreamerInfo::kOffsetP`: basic pointer types are `kOffsetP + type`.
const K_OFFSET_P: i32 = 40;

/// One member of a class layout, in on-disk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaField {
    /// Anonymous fixed-size block.
    Skip {
        /// Bytes to skip.
        bytes: usize,
    },
    /// Nested versioned object (base class or object member), skipped
    /// through its byte count. Base classes are named after the class.
    Object {
        /// Member name, `None` for placeholders.
        name: Option<String>,
    },
    /// A `TString` member.
    Text {
        /// Member name.
        name: String,
    },
    /// Fixed-size basic member (or fixed-size array of them).
    Basic {
        /// Member name.
        name: String,
        /// On-disk size in bytes.
        size: usize,
    },
    /// 4-byte element count referenced by later pointer members.
    Counter {
        /// Member name.
        name: String,
    },
    /// Counted array preceded by a one-byte presence flag.
    Pointer {
        /// Member name.
        name: String,
        /// Size of one element.
        size: usize,
        /// Counter member giving the element count.
        counter: Option<String>,
    },
}

impl SchemaField {
    /// Member name, if the field has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaField::Skip { .. } => None,
            SchemaField::Object { name } => name.as_deref(),
            SchemaField::Text { name }
            | SchemaField::Basic { name, .. }
            | SchemaField::Counter { name }
            | SchemaField::Pointer { name, .. } => Some(name),
        }
    }

    fn object(name: &str) -> Self {
        SchemaField::Object { name: Some(name.to_string()) }
    }

    fn placeholder() -> Self {
        SchemaField::Object { name: None }
    }

    fn basic(name: &str, size: usize) -> Self {
        SchemaField::Basic { name: name.to_string(), size }
    }

    fn counter(name: &str) -> Self {
        SchemaField::Counter { name: name.to_string() }
    }

    fn pointer(name: &str, size: usize, counter: &str) -> Self {
        SchemaField::Pointer {
            name: name.to_string(),
            size,
            counter: Some(counter.to_string()),
        }
    }
}

/// Class layouts by class name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    classes: HashMap<String, Vec<SchemaField>>,
}

impl SchemaRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout of `class`.
    pub fn get(&self, class: &str) -> Option<&[SchemaField]> {
        self.classes.get(class).map(Vec::as_slice)
    }

    /// Layout of `class`, or [`RootError::MissingSchema`].
    pub fn require(&self, class: &str) -> Result<&[SchemaField]> {
        self.get(class).ok_or_else(|| RootError::MissingSchema(class.to_string()))
    }

    /// Whether a layout is registered for `class`.
    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    /// Register a layout; an existing layout for the class is kept.
    pub fn insert(&mut self, class: impl Into<String>, fields: Vec<SchemaField>) -> bool {
        match self.classes.entry(class.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(v) => {
                v.insert(fields);
                true
            }
        }
    }

    /// Registered class names, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Parse the decompressed payload of a `StreamerInfo` key.
    ///
    /// `key_len` is the key header length, which class back-references
    /// count from. Returns the number of classes added.
    pub fn parse_streamer_list(&mut self, payload: &[u8], key_len: usize) -> Result<usize> {
        let mut r = RBuffer::new(payload);
        let mut refs = ClassRefs::new(key_len);

        r.read_version()?; // TList
        r.read_tobject()?;
        r.skip_string()?; // fName
        let n = r.read_i32()?;

        let mut added = 0;
        for _ in 0..n.max(0) {
            if let Some((class, end)) = refs.read_element(&mut r)? {
                if class == "TStreamerInfo" {
                    let (name, fields) = read_streamer_info(&mut r, &mut refs)?;
                    if self.insert(name, fields) {
                        added += 1;
                    }
                } else {
                    log::debug!("skipping {} in streamer list", class);
                }
                r.set_pos(end)?;
            }
            r.skip_string()?; // per-entry option
        }
        Ok(added)
    }

    /// Install built-in `TH1` and `TAxis` layouts where missing.
    pub fn install_histogram_fallbacks(&mut self) {
        use SchemaField::*;
        self.insert(
            "TH1",
            vec![
                SchemaField::placeholder(),
                SchemaField::placeholder(),
                SchemaField::placeholder(),
                SchemaField::placeholder(),
                SchemaField::basic("fNcells", 4),
                SchemaField::object("fXaxis"),
                SchemaField::object("fYaxis"),
                SchemaField::object("fZaxis"),
                // fBarOffset, fBarWidth, fEntries .. fNormFactor
                Skip { bytes: 2 * 2 + 8 * 8 },
                SchemaField::placeholder(),
                SchemaField::object("fSumw2"),
            ],
        );
        self.insert(
            "TAxis",
            vec![
                SchemaField::placeholder(),
                SchemaField::placeholder(),
                SchemaField::basic("fNbins", 4),
                SchemaField::basic("fXmin", 8),
                SchemaField::basic("fXmax", 8),
                SchemaField::object("fXbins"),
            ],
        );
    }

    /// Install built-in `TTree` and `TBranch` layouts where missing.
    pub fn install_tree_fallbacks(&mut self) {
        use SchemaField::*;
        self.insert(
            "TTree",
            vec![
                SchemaField::placeholder(),
                SchemaField::placeholder(),
                SchemaField::placeholder(),
                SchemaField::placeholder(),
                SchemaField::basic("fEntries", 8),
                Skip { bytes: 5 * 8 + 4 * 4 },
                SchemaField::counter("fNClusterRange"),
                Skip { bytes: 6 * 8 },
                SchemaField::pointer("fClusterRangeEnd", 8, "fNClusterRange"),
                SchemaField::pointer("fClusterSize", 8, "fNClusterRange"),
                SchemaField::object("fBranches"),
            ],
        );
        self.insert(
            "TBranch",
            vec![
                SchemaField::object("TNamed"),
                SchemaField::placeholder(),
                Skip { bytes: 3 * 4 },
                SchemaField::basic("fWriteBasket", 4),
                Skip { bytes: 8 + 4 },
                SchemaField::counter("fMaxBaskets"),
                Skip { bytes: 4 + 4 * 8 },
                SchemaField::object("fBranches"),
                SchemaField::object("fLeaves"),
                SchemaField::object("fBaskets"),
                SchemaField::pointer("fBasketBytes", 4, "fMaxBaskets"),
                SchemaField::pointer("fBasketEntry", 8, "fMaxBaskets"),
                SchemaField::pointer("fBasketSeek", 8, "fMaxBaskets"),
            ],
        );
    }
}

/// Read one `TStreamerInfo` body; the cursor sits after its class tag.
fn read_streamer_info(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<(String, Vec<SchemaField>)> {
    r.read_version()?;
    let (class_name, _title) = r.read_tnamed()?;
    r.skip(8)?; // fCheckSum, fClassVersion

    let mut fields = Vec::new();
    let Some((array_class, array_end)) = refs.read_element(r)? else {
        return Ok((class_name, fields));
    };
    if array_class != "TObjArray" {
        return Err(RootError::Deserialization(format!(
            "streamer elements of {} stored as {}",
            class_name, array_class
        )));
    }
    r.read_version()?;
    r.read_tobject()?;
    r.skip_string()?; // fName
    let n = r.read_i32()?;
    let lowb = r.read_i32()?;

    for i in 0..n.max(0) {
        let Some((element_class, end)) = refs.read_element(r)? else {
            continue;
        };
        if i >= lowb && !element_class.is_empty() {
            if let Some(field) = read_element(r, &element_class)? {
                fields.push(field);
            }
        }
        r.set_pos(end)?;
    }
    r.set_pos(array_end)?;
    Ok((class_name, fields))
}

/// Map one `TStreamerElement` subclass to a schema field.
fn read_element(r: &mut RBuffer, element_class: &str) -> Result<Option<SchemaField>> {
    r.read_version()?; // TStreamerXXX
    r.read_version()?; // TStreamerElement
    let (name, title) = r.read_tnamed()?;
    let ty = r.read_i32()?;
    let size = r.read_i32()?.max(0) as usize;

    let field = match element_class {
        "TStreamerBase"
        | "TStreamerObject"
        | "TStreamerObjectAny"
        | "TStreamerObjectPointer"
        | "TStreamerObjectAnyPointer"
        | "TStreamerSTL"
        | "TStreamerSTLstring" => SchemaField::Object { name: Some(name) },
        "TStreamerString" => SchemaField::Text { name },
        "TStreamerBasicType" if ty == K_COUNTER => SchemaField::Counter { name },
        "TStreamerBasicType" => SchemaField::Basic { name, size },
        "TStreamerBasicPointer" => SchemaField::Pointer {
            name,
            size: pointer_element_size(ty - K_OFFSET_P),
            counter: counter_from_title(&title),
        },
        other => {
            log::debug!("unhandled streamer element {} for member {}", other, name);
            return Ok(None);
        }
    };
    Ok(Some(field))
}

/// Element size of a basic pointer type (`EDataType` code).
fn pointer_element_size(ty: i32) -> usize {
    match ty {
        1 | 11 => 1,
        2 | 12 | 19 => 2,
        3 | 5 | 9 | 13 => 4,
        4 | 8 | 14 | 16 | 17 => 8,
        _ => 0,
    }
}

/// Counter name from a member title like `"[fNcells] bin content"`.
fn counter_from_title(title: &str) -> Option<String> {
    let open = title.find('[')?;
    let close = open + title[open..].find(']')?;
    Some(title[open + 1..close].to_string())
}
