use std::fmt;
use std::iter::FusedIterator;

use super::{ArrayEntry, JsonStr, NodeRef, PairEntry};

/// Forward cursor over array children.
///
/// Copying the cursor snapshots the position; there is no way back to the
/// start other than asking the array for a new one.
#[derive(Clone, Copy)]
pub struct ArrayIter<'a> {
    cursor: Option<&'a ArrayEntry<'a>>,
}

impl<'a> ArrayIter<'a> {
    pub(crate) fn new(head: Option<&'a ArrayEntry<'a>>) -> Self {
        Self { cursor: head }
    }

    pub fn empty() -> Self {
        Self { cursor: None }
    }

    pub fn is_done(&self) -> bool {
        self.cursor.is_none()
    }
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.cursor?;
        self.cursor = entry.next.get();
        Some(entry.value)
    }
}

impl FusedIterator for ArrayIter<'_> {}

impl fmt::Debug for ArrayIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayIter")
            .field("done", &self.is_done())
            .finish()
    }
}

/// Forward cursor over object pairs, in insertion order.
#[derive(Clone, Copy)]
pub struct ObjectIter<'a> {
    cursor: Option<&'a PairEntry<'a>>,
}

impl<'a> ObjectIter<'a> {
    pub(crate) fn new(head: Option<&'a PairEntry<'a>>) -> Self {
        Self { cursor: head }
    }

    pub fn empty() -> Self {
        Self { cursor: None }
    }

    pub fn is_done(&self) -> bool {
        self.cursor.is_none()
    }
}

impl<'a> Iterator for ObjectIter<'a> {
    type Item = (JsonStr<'a>, NodeRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let pair = self.cursor?;
        self.cursor = pair.next.get();
        Some((pair.key, pair.value))
    }
}

impl FusedIterator for ObjectIter<'_> {}

impl fmt::Debug for ObjectIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectIter")
            .field("done", &self.is_done())
            .finish()
    }
}
