//! Single-pass extraction of named object members.
//!
//! The object is walked once. Each pair is compared against the expectations
//! that are still pending; a match whose value passes the type check fills the
//! expectation's slot and retires it. Scans start at the first expectation
//! that may still be pending, which makes the common case (members arrive in
//! the order they were asked for) close to linear without changing which
//! values are picked.

mod format;

use tracing::trace;

use crate::dom::{Node, NodeRef};
use crate::{Error, Result};

pub use format::{parse_format, Expected, TypeCode, TypeFormat};

/// Largest number of expectations a single unpack accepts.
pub const MAX_UNPACK_KEYS: usize = 64;

/// One expectation: a key, the accepted kind and the slot a match lands in.
#[derive(Debug, Clone, Copy)]
pub struct Field<'k, 'a> {
    pub key: &'k str,
    pub code: TypeCode,
    pub slot: Option<NodeRef<'a>>,
}

impl<'k, 'a> Field<'k, 'a> {
    pub fn new(key: &'k str, code: TypeCode) -> Self {
        Self {
            key,
            code,
            slot: None,
        }
    }
}

/// Fills `fields` from the pairs of `object` and returns how many matched.
///
/// The first pair that matches an expectation wins; later pairs with the same
/// key are ignored for it. A pair is offered to every pending expectation, so
/// repeated keys in `fields` are all filled from the same pair. Slots of
/// unmatched fields are left as they were.
pub fn unpack<'a>(object: &Node<'a>, fields: &mut [Field<'_, 'a>]) -> Result<usize> {
    if fields.len() > MAX_UNPACK_KEYS {
        return Err(Error::unpack(format!(
            "cannot unpack {} keys, the limit is {MAX_UNPACK_KEYS}",
            fields.len()
        )));
    }
    let Node::Object(members) = object else {
        return Err(Error::unpack(format!(
            "cannot unpack keys from {} node",
            object.kind()
        )));
    };

    let mut pending = [false; MAX_UNPACK_KEYS];
    pending[..fields.len()].fill(true);
    let mut settled = 0;
    let mut found = 0;

    for (key, value) in members.iter() {
        if settled == fields.len() {
            break;
        }
        for index in settled..fields.len() {
            if !pending[index] {
                continue;
            }
            let field = &mut fields[index];
            if field.key != key.as_str() || !field.code.accepts(value) {
                continue;
            }
            field.slot = Some(value);
            pending[index] = false;
            found += 1;
        }
        while settled < fields.len() && !pending[settled] {
            settled += 1;
        }
    }

    trace!(requested = fields.len(), found, "unpacked object");
    Ok(found)
}

/// [`unpack`] driven by parallel key and format lists, writing matches into
/// `outputs` at the matching positions.
pub fn unpack_format<'a>(
    object: &Node<'a>,
    keys: &[&str],
    format: &str,
    outputs: &mut [Option<NodeRef<'a>>],
) -> Result<usize> {
    let codes = parse_format(format)?;
    if codes.len() != keys.len() {
        return Err(Error::format(format!(
            "format {format:?} has {} codes for {} keys",
            codes.len(),
            keys.len()
        )));
    }
    if outputs.len() < keys.len() {
        return Err(Error::unpack(format!(
            "{} output slots for {} keys",
            outputs.len(),
            keys.len()
        )));
    }

    let mut fields: Vec<Field<'_, 'a>> = keys
        .iter()
        .zip(codes.iter())
        .zip(outputs.iter())
        .map(|((key, code), slot)| Field {
            key: *key,
            code: *code,
            slot: *slot,
        })
        .collect();
    let found = unpack(object, &mut fields)?;
    for (output, field) in outputs.iter_mut().zip(fields) {
        *output = field.slot;
    }
    Ok(found)
}

impl<'a> Node<'a> {
    pub fn unpack(&self, fields: &mut [Field<'_, 'a>]) -> Result<usize> {
        unpack(self, fields)
    }
}
