//! Class back-references for polymorphic members (`TObjArray`, `TList`).
//!
//! ROOT prefixes every element of a polymorphic collection with a byte count
//! and a class tag:
//! - `kNewClassTag (0xFFFFFFFF)` introduces a new class name (NUL-terminated)
//! - `kClassMask (0x80000000) | offset` references a previously registered class
//!
//! New classes are registered under their byte offset in the key buffer
//! (`displacement + tag position + kMapOffset`), which is what later
//! references carry. The table lives for one top-level object decode.

use std::collections::HashMap;

use crate::error::{Result, RootError};
use crate::rbuffer::{K_BYTE_COUNT_MASK, RBuffer};

const K_NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
const K_CLASS_MASK: u32 = 0x8000_0000;
/// ROOT offsets map entries by 2 so a tag can never equal `kNullTag`.
const K_MAP_OFFSET: usize = 2;

/// Class-name table for one decoded object.
#[derive(Debug)]
pub struct ClassRefs {
    /// Key-header length: ROOT counts offsets from the start of the key.
    displacement: usize,
    classes: HashMap<u32, String>,
}

impl ClassRefs {
    /// New table for a payload whose key header is `displacement` bytes long.
    pub fn new(displacement: usize) -> Self {
        Self { displacement, classes: HashMap::new() }
    }

    /// Read the header of one collection element.
    ///
    /// Returns the element's class name and the absolute position where the
    /// element ends, or `None` for a null entry or a reference to an object
    /// that was already streamed (neither has a body to read). A reference
    /// to a class missing from the table gives an empty name; callers skip
    /// such elements to their end.
    pub fn read_element(&mut self, r: &mut RBuffer) -> Result<Option<(String, usize)>> {
        let obj_start = r.pos();
        let tag = r.read_u32()?;
        if tag & K_BYTE_COUNT_MASK == 0 {
            return Ok(None);
        }
        let byte_count = (tag & !K_BYTE_COUNT_MASK) as usize;
        let obj_end = obj_start + 4 + byte_count;
        if obj_end > r.len() {
            return Err(RootError::BufferUnderflow {
                offset: obj_start,
                need: 4 + byte_count,
                have: r.len() - obj_start,
            });
        }

        let tag_pos = r.pos();
        let class_tag = r.read_u32()?;
        let class_name = if class_tag == K_NEW_CLASS_TAG {
            let name = r.read_cstring()?;
            let key = (self.displacement + tag_pos + K_MAP_OFFSET) as u32;
            self.classes.insert(key, name.clone());
            name
        } else if class_tag & K_CLASS_MASK != 0 {
            let key = class_tag & !K_CLASS_MASK;
            match self.classes.get(&key) {
                Some(name) => name.clone(),
                None => {
                    // Tags registered inside a skipped member are never seen.
                    log::debug!("class reference {:#x} at {} was never defined", key, tag_pos);
                    String::new()
                }
            }
        } else {
            return Err(RootError::Deserialization(format!(
                "unexpected class tag {:#010x} at {}",
                class_tag, tag_pos
            )));
        };

        Ok(Some((class_name, obj_end)))
    }

    /// Number of classes seen so far.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
