//! Slab arena backing every node of a decoded document.
//!
//! Allocation bumps a cursor through the most recent slab. When a request
//! does not fit, a slab twice as large (or larger) is pushed onto the front of
//! the chain; earlier slabs are never moved or touched again, so every block
//! handed out stays valid until the arena is released. There is no way to free
//! a single block and destructors of allocated values never run.

mod slab;

use std::alloc::{self, Layout};
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ptr::{self, NonNull};
use std::{slice, str};

use tracing::{debug, trace};

use crate::dom::Node;
use crate::{Error, Result};

pub use slab::{SlabHeap, SystemHeap};

use slab::{grown_size, slab_layout, try_slab_layout, SlabHeader, HEADER_SIZE, SLAB_ALIGN};

/// Capacity of the slab an arena allocates for itself when no caller buffer
/// is supplied.
pub const DEFAULT_INITIAL_HEAP: usize = 16 * 1024;

/// Smallest caller buffer accepted as the first slab: a slab header plus room
/// for one node.
pub const MIN_INITIAL_HEAP: usize = HEADER_SIZE + mem::size_of::<Node<'static>>();

const SHORT_COPY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    pub slabs: usize,
    pub owned_slabs: usize,
    pub reserved_bytes: usize,
    pub used_bytes: usize,
}

pub struct Arena<'buf, H: SlabHeap = SystemHeap> {
    head: Cell<NonNull<SlabHeader>>,
    heap: H,
    _buffer: PhantomData<&'buf mut [MaybeUninit<u8>]>,
}

impl Arena<'static, SystemHeap> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_HEAP)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, SystemHeap)
    }
}

impl Default for Arena<'static, SystemHeap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: SlabHeap> Arena<'static, H> {
    /// Creates an arena whose first slab of `capacity` bytes comes from `heap`.
    /// Capacities below [`MIN_INITIAL_HEAP`] are rounded up to it.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` does not form a valid allocation size; use
    /// [`Arena::try_with_capacity_in`] for sizes taken from user input.
    pub fn with_capacity_in(capacity: usize, heap: H) -> Self {
        let size = capacity.max(MIN_INITIAL_HEAP);
        let base = heap.allocate(slab_layout(size));
        Self::on_owned_slab(base, size, heap)
    }

    /// Fallible form of [`Arena::with_capacity_in`]: a capacity the heap
    /// cannot provide is a heap error instead of a panic or an abort.
    pub fn try_with_capacity_in(capacity: usize, heap: H) -> Result<Self> {
        let size = capacity.max(MIN_INITIAL_HEAP);
        let base = try_slab_layout(size)
            .and_then(|layout| heap.try_allocate(layout))
            .ok_or_else(|| Error::heap(format!("cannot reserve an initial heap of {size} bytes")))?;
        Ok(Self::on_owned_slab(base, size, heap))
    }

    fn on_owned_slab(base: NonNull<u8>, size: usize, heap: H) -> Self {
        // SAFETY: `base` is a fresh, SLAB_ALIGN-aligned block of `size` bytes.
        let head = unsafe { SlabHeader::init(base, size, true, None) };
        debug!(size, "arena created with owned slab");
        Self {
            head: Cell::new(head),
            heap,
            _buffer: PhantomData,
        }
    }
}

impl<'buf> Arena<'buf, SystemHeap> {
    pub fn from_buffer(buffer: &'buf mut [MaybeUninit<u8>]) -> Result<Self> {
        Self::from_buffer_in(buffer, SystemHeap)
    }
}

impl<'buf, H: SlabHeap> Arena<'buf, H> {
    /// Uses `buffer` as the first slab. The buffer is borrowed for the life of
    /// the arena and is never handed to `heap`; slabs added on growth are.
    pub fn from_buffer_in(buffer: &'buf mut [MaybeUninit<u8>], heap: H) -> Result<Self> {
        let ptr = buffer.as_mut_ptr().cast::<u8>();
        let padding = (ptr as usize).wrapping_neg() & (SLAB_ALIGN - 1);
        let size = buffer.len().saturating_sub(padding);
        if size < MIN_INITIAL_HEAP {
            return Err(Error::heap(format!(
                "initial heap of {} bytes is below the {MIN_INITIAL_HEAP} byte minimum",
                buffer.len()
            )));
        }
        // SAFETY: `padding + size == buffer.len()`, so the aligned region lies
        // inside the exclusively borrowed buffer.
        let head = unsafe {
            let base = NonNull::new_unchecked(ptr.add(padding));
            SlabHeader::init(base, size, false, None)
        };
        debug!(size, "arena created on caller buffer");
        Ok(Self {
            head: Cell::new(head),
            heap,
            _buffer: PhantomData,
        })
    }

    /// Moves `value` into the arena. Its destructor will never run.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> &mut T {
        let ptr = self.alloc_layout(Layout::new::<T>()).cast::<T>();
        // SAFETY: the block is fresh, sized and aligned for `T`, and no other
        // reference to it exists.
        unsafe {
            ptr.as_ptr().write(value);
            &mut *ptr.as_ptr()
        }
    }

    /// Returns an uninitialized block of exactly `layout.size()` bytes.
    pub fn alloc_layout(&self, layout: Layout) -> NonNull<u8> {
        if let Some(ptr) = self.head().bump(layout) {
            return ptr;
        }
        let slab = self.grow(layout);
        // SAFETY: `grow` returns the live head slab.
        match unsafe { slab.as_ref() }.bump(layout) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(layout),
        }
    }

    /// Copies `text` into a NUL-terminated block of `text.len() + 1` bytes and
    /// returns the whole block, terminator included.
    pub fn alloc_str_with_nul(&self, text: &str) -> &str {
        let len = text.len();
        let layout = match Layout::from_size_align(len + 1, 1) {
            Ok(layout) => layout,
            Err(_) => alloc::handle_alloc_error(Layout::new::<u8>()),
        };
        let dst = self.alloc_layout(layout).as_ptr();
        let src = text.as_bytes();
        // SAFETY: `dst` is valid for `len + 1` bytes and disjoint from `src`;
        // the copy is valid UTF-8 followed by a NUL byte.
        unsafe {
            if len < SHORT_COPY {
                for (index, byte) in src.iter().enumerate() {
                    dst.add(index).write(*byte);
                }
            } else {
                ptr::copy_nonoverlapping(src.as_ptr(), dst, len);
            }
            dst.add(len).write(0);
            str::from_utf8_unchecked(slice::from_raw_parts(dst, len + 1))
        }
    }

    pub fn stats(&self) -> ArenaStats {
        let mut stats = ArenaStats::default();
        let mut cursor = Some(self.head.get());
        while let Some(slab) = cursor {
            // SAFETY: every slab in the chain lives until the arena is dropped.
            let header = unsafe { slab.as_ref() };
            stats.slabs += 1;
            if header.owned() {
                stats.owned_slabs += 1;
            }
            stats.reserved_bytes += header.size();
            stats.used_bytes += header.used();
            cursor = header.next();
        }
        stats
    }

    /// Frees every owned slab. Everything allocated from the arena goes with it.
    pub fn release(self) {
        trace!(stats = ?self.stats(), "releasing arena");
        drop(self);
    }

    fn head(&self) -> &SlabHeader {
        // SAFETY: the head always points at a live slab of this arena.
        unsafe { self.head.get().as_ref() }
    }

    fn grow(&self, layout: Layout) -> NonNull<SlabHeader> {
        let previous = self.head.get();
        let previous_size = self.head().size();
        let size = grown_size(previous_size, layout);
        let base = self.heap.allocate(slab_layout(size));
        // SAFETY: `base` is a fresh, SLAB_ALIGN-aligned block of `size` bytes.
        let slab = unsafe { SlabHeader::init(base, size, true, Some(previous)) };
        self.head.set(slab);
        debug!(
            previous = previous_size,
            size,
            request = layout.size(),
            "arena grew a new slab"
        );
        slab
    }
}

impl<H: SlabHeap> Drop for Arena<'_, H> {
    fn drop(&mut self) {
        let mut cursor = Some(self.head.get());
        let mut freed = 0usize;
        while let Some(slab) = cursor {
            // SAFETY: the header is read before the slab holding it is freed.
            let (next, owned, size) = unsafe {
                let header = slab.as_ref();
                (header.next(), header.owned(), header.size())
            };
            if owned {
                // SAFETY: owned slabs come from `self.heap` with `slab_layout(size)`.
                unsafe { self.heap.deallocate(slab.cast(), slab_layout(size)) };
                freed += 1;
            }
            cursor = next;
        }
        trace!(freed, "arena slabs freed");
    }
}

impl<H: SlabHeap> fmt::Debug for Arena<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena").field("stats", &self.stats()).finish()
    }
}
