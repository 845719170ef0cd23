//! Schema-driven cursor navigation within one object.

use std::collections::HashMap;

use crate::error::{Result, RootError};
use crate::rbuffer::RBuffer;
use crate::streamer::SchemaField;

/// Element counts read from counter members, by member name.
pub type Counters = HashMap<String, i32>;

/// Advance `r` from the member after `current` (or the start of the layout
/// when `current` is `None`) to the first byte of member `target`.
///
/// Every member in between is consumed according to its kind; counter
/// members are recorded in `counters` for later pointer members. For a
/// pointer member the cursor stops on its presence flag.
///
/// Members can only be visited in increasing order: a `target` at or
/// before `current`, or one the layout does not contain, is
/// [`RootError::SchemaFieldNotFound`].
pub fn advance_to(
    r: &mut RBuffer,
    class: &str,
    schema: &[SchemaField],
    current: Option<&str>,
    target: &str,
    counters: &mut Counters,
) -> Result<()> {
    let start = match current {
        None => 0,
        Some(cur) => match schema.iter().position(|f| f.name() == Some(cur)) {
            Some(i) => i + 1,
            None => return Err(not_found(class, cur)),
        },
    };

    for field in &schema[start..] {
        if field.name() == Some(target) {
            return Ok(());
        }
        consume(r, field, counters)?;
    }

    log::error!("{}: no member {} after {:?}", class, target, current);
    Err(not_found(class, target))
}

/// Consume member `name` of `schema`; the cursor sits on its first byte.
pub fn skip_member(
    r: &mut RBuffer,
    class: &str,
    schema: &[SchemaField],
    name: &str,
    counters: &mut Counters,
) -> Result<()> {
    let field = schema
        .iter()
        .find(|f| f.name() == Some(name))
        .ok_or_else(|| not_found(class, name))?;
    consume(r, field, counters)
}

fn consume(r: &mut RBuffer, field: &SchemaField, counters: &mut Counters) -> Result<()> {
    match field {
        SchemaField::Skip { bytes } => r.skip(*bytes),
        SchemaField::Basic { size, .. } => r.skip(*size),
        SchemaField::Object { .. } => r.skip_versioned(),
        SchemaField::Text { .. } => r.skip_string(),
        SchemaField::Counter { name } => {
            let n = r.read_i32()?;
            counters.insert(name.clone(), n);
            Ok(())
        }
        SchemaField::Pointer { size, counter, .. } => {
            let count = match counter {
                Some(c) => counters.get(c).copied().unwrap_or(0).max(0) as usize,
                None => 1,
            };
            r.skip(size.saturating_mul(count).saturating_add(1))
        }
    }
}

fn not_found(class: &str, field: &str) -> RootError {
    RootError::SchemaFieldNotFound { class: class.to_string(), field: field.to_string() }
}
