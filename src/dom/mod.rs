//! Typed nodes of a decoded document.
//!
//! Nodes are allocated in an [`Arena`](crate::arena::Arena) and refer to each
//! other through `&'a` references into that same arena. Containers keep their
//! children in append-only singly-linked lists; the cells live in the arena
//! too.
//!
//! Links are only written while the tokenizer runs. A tree handed out by a
//! decode is immutable and can be read from several threads at once.

pub mod iter;

use std::cell::Cell;
use std::fmt;

pub use iter::{ArrayIter, ObjectIter};

/// A node reference handed out by the builder and the navigation API.
pub type NodeRef<'a> = &'a Node<'a>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Null = 0,
    True = 1,
    False = 2,
    Int32 = 3,
    Int64 = 4,
    Double = 5,
    String = 6,
    Array = 7,
    Object = 8,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::True => "true",
            Kind::False => "false",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub enum Node<'a> {
    Null,
    True,
    False,
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(JsonStr<'a>),
    Array(ArrayNode<'a>),
    Object(ObjectNode<'a>),
}

// Arena teardown never runs destructors.
const _: () = assert!(!std::mem::needs_drop::<Node<'static>>());
const _: () = assert!(!std::mem::needs_drop::<ArrayEntry<'static>>());
const _: () = assert!(!std::mem::needs_drop::<PairEntry<'static>>());

/// Borrowed view of an arena string.
///
/// The backing buffer is NUL-terminated; [`JsonStr::as_str`] excludes the
/// terminator and [`JsonStr::as_bytes_with_nul`] includes it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct JsonStr<'a> {
    raw: &'a str,
    chars: usize,
}

impl<'a> JsonStr<'a> {
    pub const EMPTY: JsonStr<'static> = JsonStr { raw: "\0", chars: 0 };

    /// `raw` must end with a NUL byte.
    pub(crate) fn from_raw(raw: &'a str) -> Self {
        debug_assert!(raw.ends_with('\0'));
        let text = &raw[..raw.len() - 1];
        Self {
            raw,
            chars: text.chars().count(),
        }
    }

    pub fn as_str(&self) -> &'a str {
        &self.raw[..self.raw.len() - 1]
    }

    pub fn as_bytes_with_nul(&self) -> &'a [u8] {
        self.raw.as_bytes()
    }

    /// Length in bytes, terminator excluded.
    pub fn len(&self) -> usize {
        self.raw.len() - 1
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for JsonStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for JsonStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for JsonStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for JsonStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

pub(crate) struct ArrayEntry<'a> {
    pub(crate) value: NodeRef<'a>,
    pub(crate) next: Cell<Option<&'a ArrayEntry<'a>>>,
}

pub(crate) struct PairEntry<'a> {
    pub(crate) key: JsonStr<'a>,
    pub(crate) value: NodeRef<'a>,
    pub(crate) next: Cell<Option<&'a PairEntry<'a>>>,
}

// SAFETY: list cells are written only by the crate's builder, which borrows a
// `!Sync` arena and links only nodes allocated by the decode in progress. No
// cell reachable from a returned root is written again, so shared access to a
// finished tree only reads.
unsafe impl Sync for ArrayEntry<'_> {}
unsafe impl Sync for PairEntry<'_> {}
unsafe impl Sync for ArrayNode<'_> {}
unsafe impl Sync for ObjectNode<'_> {}

#[derive(Default)]
pub struct ArrayNode<'a> {
    head: Cell<Option<&'a ArrayEntry<'a>>>,
    tail: Cell<Option<&'a ArrayEntry<'a>>>,
}

impl<'a> ArrayNode<'a> {
    pub(crate) fn push(&self, entry: &'a ArrayEntry<'a>) {
        match self.tail.get() {
            Some(tail) => tail.next.set(Some(entry)),
            None => self.head.set(Some(entry)),
        }
        self.tail.set(Some(entry));
    }

    pub fn iter(&self) -> ArrayIter<'a> {
        ArrayIter::new(self.head.get())
    }

    pub fn is_empty(&self) -> bool {
        self.head.get().is_none()
    }
}

impl fmt::Debug for ArrayNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[derive(Default)]
pub struct ObjectNode<'a> {
    head: Cell<Option<&'a PairEntry<'a>>>,
    tail: Cell<Option<&'a PairEntry<'a>>>,
}

impl<'a> ObjectNode<'a> {
    pub(crate) fn push(&self, pair: &'a PairEntry<'a>) {
        match self.tail.get() {
            Some(tail) => tail.next.set(Some(pair)),
            None => self.head.set(Some(pair)),
        }
        self.tail.set(Some(pair));
    }

    pub fn iter(&self) -> ObjectIter<'a> {
        ObjectIter::new(self.head.get())
    }

    pub fn is_empty(&self) -> bool {
        self.head.get().is_none()
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<NodeRef<'a>> {
        self.iter()
            .find(|(name, _)| name.as_str() == key)
            .map(|(_, value)| value)
    }
}

impl fmt::Debug for ObjectNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            Node::Null => Kind::Null,
            Node::True => Kind::True,
            Node::False => Kind::False,
            Node::Int32(_) => Kind::Int32,
            Node::Int64(_) => Kind::Int64,
            Node::Double(_) => Kind::Double,
            Node::String(_) => Kind::String,
            Node::Array(_) => Kind::Array,
            Node::Object(_) => Kind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Node::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Node::False)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Node::True | Node::False)
    }

    pub fn is_int32(&self) -> bool {
        matches!(self, Node::Int32(_))
    }

    pub fn is_int64(&self) -> bool {
        matches!(self, Node::Int64(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Node::Int32(_) | Node::Int64(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Node::Double(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Node::Int32(_) | Node::Int64(_) | Node::Double(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Node::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Node::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Node::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::True => Some(true),
            Node::False => Some(false),
            _ => None,
        }
    }

    pub fn int32(&self) -> Option<i32> {
        match self {
            Node::Int32(value) => Some(*value),
            _ => None,
        }
    }

    pub fn int64(&self) -> Option<i64> {
        match self {
            Node::Int64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn double(&self) -> Option<f64> {
        match self {
            Node::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn string(&self) -> Option<JsonStr<'a>> {
        match self {
            Node::String(text) => Some(*text),
            _ => None,
        }
    }

    /// The string payload, or an empty string for any other kind.
    pub fn read_string(&self) -> JsonStr<'a> {
        self.string().unwrap_or(JsonStr::EMPTY)
    }

    pub fn as_array(&self) -> Option<&ArrayNode<'a>> {
        match self {
            Node::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectNode<'a>> {
        match self {
            Node::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Cursor over the children of an array. Empty for every other kind.
    pub fn begin_array(&self) -> ArrayIter<'a> {
        self.as_array()
            .map(ArrayNode::iter)
            .unwrap_or_else(ArrayIter::empty)
    }

    /// Cursor over the pairs of an object. Empty for every other kind.
    pub fn begin_object(&self) -> ObjectIter<'a> {
        self.as_object()
            .map(ObjectNode::iter)
            .unwrap_or_else(ObjectIter::empty)
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => f.write_str("Null"),
            Node::True => f.write_str("True"),
            Node::False => f.write_str("False"),
            Node::Int32(value) => f.debug_tuple("Int32").field(value).finish(),
            Node::Int64(value) => f.debug_tuple("Int64").field(value).finish(),
            Node::Double(value) => f.debug_tuple("Double").field(value).finish(),
            Node::String(text) => f.debug_tuple("String").field(text).finish(),
            Node::Array(array) => f.debug_tuple("Array").field(array).finish(),
            Node::Object(object) => f.debug_tuple("Object").field(object).finish(),
        }
    }
}
