//! Construction protocol driven by a tokenizer.
//!
//! A tokenizer never sees node internals; it asks a [`Builder`] for opaque
//! handles and links them together as the grammar unfolds. [`DomBuilder`]
//! answers every call with one arena allocation.

use std::cell::Cell;

use crate::arena::{Arena, SlabHeap, SystemHeap};
use crate::dom::{ArrayEntry, ArrayNode, JsonStr, Node, NodeRef, ObjectNode, PairEntry};

pub trait Builder {
    type Handle: Copy;

    fn new_null(&mut self) -> Self::Handle;
    fn new_true(&mut self) -> Self::Handle;
    fn new_false(&mut self) -> Self::Handle;
    fn new_int32(&mut self, value: i32) -> Self::Handle;
    fn new_int64(&mut self, value: i64) -> Self::Handle;
    fn new_double(&mut self, value: f64) -> Self::Handle;
    fn new_string(&mut self, text: &str) -> Self::Handle;
    fn new_array(&mut self) -> Self::Handle;
    fn new_object(&mut self) -> Self::Handle;

    fn append_array_entry(&mut self, array: Self::Handle, value: Self::Handle);

    /// `key` is a handle returned by [`Builder::new_string`].
    fn append_object_pair(&mut self, object: Self::Handle, key: Self::Handle, value: Self::Handle);

    /// Nodes are reclaimed together with their arena, never one at a time.
    fn release(&mut self, _node: Self::Handle) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildStats {
    pub nodes: usize,
    pub cells: usize,
}

/// Builds nodes in an arena on behalf of a decode.
///
/// Only a decode creates one, so a tree that has been handed out can no
/// longer be extended:
///
/// ```compile_fail
/// use ujdom::{Builder, DomBuilder, Session};
///
/// let session = Session::new();
/// let root = session.decode(b"[1]").unwrap();
/// let mut builder = DomBuilder::new(session.arena());
/// builder.append_array_entry(root, root);
/// ```
pub struct DomBuilder<'a, 'buf, H: SlabHeap = SystemHeap> {
    arena: &'a Arena<'buf, H>,
    nodes: Cell<usize>,
    cells: Cell<usize>,
}

impl<'a, 'buf, H: SlabHeap> DomBuilder<'a, 'buf, H> {
    pub(crate) fn new(arena: &'a Arena<'buf, H>) -> Self {
        Self {
            arena,
            nodes: Cell::new(0),
            cells: Cell::new(0),
        }
    }

    pub fn stats(&self) -> BuildStats {
        BuildStats {
            nodes: self.nodes.get(),
            cells: self.cells.get(),
        }
    }

    fn node(&self, node: Node<'a>) -> NodeRef<'a> {
        self.nodes.set(self.nodes.get() + 1);
        self.arena.alloc(node)
    }

    fn cell<T: 'a>(&self, cell: T) -> &'a T {
        self.cells.set(self.cells.get() + 1);
        self.arena.alloc(cell)
    }
}

impl<'a, 'buf, H: SlabHeap> Builder for DomBuilder<'a, 'buf, H> {
    type Handle = NodeRef<'a>;

    fn new_null(&mut self) -> NodeRef<'a> {
        self.node(Node::Null)
    }

    fn new_true(&mut self) -> NodeRef<'a> {
        self.node(Node::True)
    }

    fn new_false(&mut self) -> NodeRef<'a> {
        self.node(Node::False)
    }

    fn new_int32(&mut self, value: i32) -> NodeRef<'a> {
        self.node(Node::Int32(value))
    }

    fn new_int64(&mut self, value: i64) -> NodeRef<'a> {
        self.node(Node::Int64(value))
    }

    fn new_double(&mut self, value: f64) -> NodeRef<'a> {
        self.node(Node::Double(value))
    }

    fn new_string(&mut self, text: &str) -> NodeRef<'a> {
        let raw = self.arena.alloc_str_with_nul(text);
        self.node(Node::String(JsonStr::from_raw(raw)))
    }

    fn new_array(&mut self) -> NodeRef<'a> {
        self.node(Node::Array(ArrayNode::default()))
    }

    fn new_object(&mut self) -> NodeRef<'a> {
        self.node(Node::Object(ObjectNode::default()))
    }

    fn append_array_entry(&mut self, array: NodeRef<'a>, value: NodeRef<'a>) {
        let Node::Array(array) = array else {
            return;
        };
        let entry = self.cell(ArrayEntry {
            value,
            next: Cell::new(None),
        });
        array.push(entry);
    }

    fn append_object_pair(&mut self, object: NodeRef<'a>, key: NodeRef<'a>, value: NodeRef<'a>) {
        let Node::Object(object) = object else {
            return;
        };
        let pair = self.cell(PairEntry {
            key: key.read_string(),
            value,
            next: Cell::new(None),
        });
        object.push(pair);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Kind;

    #[rstest::rstest]
    fn test_scalars_keep_their_tag() {
        let arena = Arena::new();
        let mut builder = DomBuilder::new(&arena);

        assert_eq!(builder.new_null().kind(), Kind::Null);
        assert_eq!(builder.new_true().kind(), Kind::True);
        assert_eq!(builder.new_false().kind(), Kind::False);
        assert_eq!(builder.new_int32(5).int32(), Some(5));
        assert_eq!(builder.new_int64(5).int64(), Some(5));
        assert_eq!(builder.new_double(5.0).double(), Some(5.0));
        assert_eq!(builder.stats().nodes, 6);
    }

    #[rstest::rstest]
    #[case("")]
    #[case("abc")]
    #[case("abcd")]
    #[case("Uppsala")]
    fn test_string_copies_and_counts_chars(#[case] text: &str) {
        let arena = Arena::new();
        let mut builder = DomBuilder::new(&arena);
        let owned = text.to_string();
        let node = builder.new_string(&owned);
        drop(owned);

        let view = node.string().unwrap();
        assert_eq!(view, text);
        assert_eq!(view.char_len(), text.chars().count());
        assert_eq!(view.as_bytes_with_nul().last(), Some(&0));
    }

    #[rstest::rstest]
    fn test_append_links_in_order() {
        let arena = Arena::new();
        let mut builder = DomBuilder::new(&arena);
        let array = builder.new_array();
        assert!(array.begin_array().is_done());

        for value in 0..5 {
            let child = builder.new_int32(value);
            builder.append_array_entry(array, child);
        }
        let values: Vec<i32> = array.begin_array().map(|node| node.numeric_as_i32()).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
        assert_eq!(builder.stats(), BuildStats { nodes: 6, cells: 5 });
    }

    #[rstest::rstest]
    fn test_object_keeps_duplicate_keys() {
        let arena = Arena::new();
        let mut builder = DomBuilder::new(&arena);
        let object = builder.new_object();
        for value in [1, 2] {
            let key = builder.new_string("id");
            let value = builder.new_int32(value);
            builder.append_object_pair(object, key, value);
        }

        let pairs: Vec<(String, i32)> = object
            .begin_object()
            .map(|(key, value)| (key.to_string(), value.numeric_as_i32()))
            .collect();
        assert_eq!(pairs, vec![("id".to_string(), 1), ("id".to_string(), 2)]);
        assert_eq!(object.as_object().unwrap().get("id").unwrap().int32(), Some(1));
    }

    #[rstest::rstest]
    fn test_append_to_scalar_is_ignored() {
        let arena = Arena::new();
        let mut builder = DomBuilder::new(&arena);
        let scalar = builder.new_null();
        let child = builder.new_true();
        builder.append_array_entry(scalar, child);
        builder.release(child);
        assert!(scalar.is_null());
        assert_eq!(builder.stats().cells, 0);
    }
}
