use std::fmt;
use std::mem::MaybeUninit;

use crate::arena::{SlabHeap, SystemHeap, DEFAULT_INITIAL_HEAP};

/// Where a session's arena gets its memory.
///
/// Without a caller buffer the arena allocates its first slab of
/// `initial_capacity` bytes from `heap`. With one, the buffer is the first
/// slab and `heap` only serves growth.
pub struct HeapConfig<'buf, H: SlabHeap = SystemHeap> {
    pub initial_buffer: Option<&'buf mut [MaybeUninit<u8>]>,
    pub initial_capacity: usize,
    pub heap: H,
}

impl HeapConfig<'static, SystemHeap> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for HeapConfig<'static, SystemHeap> {
    fn default() -> Self {
        Self {
            initial_buffer: None,
            initial_capacity: DEFAULT_INITIAL_HEAP,
            heap: SystemHeap,
        }
    }
}

impl<'buf, H: SlabHeap> HeapConfig<'buf, H> {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_initial_buffer<'b>(self, buffer: &'b mut [MaybeUninit<u8>]) -> HeapConfig<'b, H> {
        HeapConfig {
            initial_buffer: Some(buffer),
            initial_capacity: self.initial_capacity,
            heap: self.heap,
        }
    }

    pub fn with_heap<H2: SlabHeap>(self, heap: H2) -> HeapConfig<'buf, H2> {
        HeapConfig {
            initial_buffer: self.initial_buffer,
            initial_capacity: self.initial_capacity,
            heap,
        }
    }
}

impl<H: SlabHeap> fmt::Debug for HeapConfig<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapConfig")
            .field(
                "initial_buffer",
                &self.initial_buffer.as_ref().map(|buffer| buffer.len()),
            )
            .field("initial_capacity", &self.initial_capacity)
            .finish_non_exhaustive()
    }
}
