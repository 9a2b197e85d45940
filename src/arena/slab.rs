use std::alloc::{self, Layout};
use std::cell::Cell;
use std::mem;
use std::ptr::NonNull;

pub(crate) const SLAB_ALIGN: usize = 16;

/// Bytes at the front of every slab reserved for its header.
pub(crate) const HEADER_SIZE: usize = align_up(mem::size_of::<SlabHeader>(), SLAB_ALIGN);

/// Source of slab memory for an [`Arena`](super::Arena).
///
/// Slabs are requested with [`SlabHeap::allocate`] when the arena grows and
/// handed back with [`SlabHeap::deallocate`] when it is released. Running out
/// of memory is not something the arena recovers from; implementations report
/// it the way their host does (the system heap aborts through
/// [`std::alloc::handle_alloc_error`]).
pub trait SlabHeap {
    fn allocate(&self, layout: Layout) -> NonNull<u8>;

    /// Like [`SlabHeap::allocate`], but reports exhaustion as `None`. Used for
    /// the first slab, whose size comes from configuration.
    fn try_allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        Some(self.allocate(layout))
    }

    /// # Safety
    ///
    /// `ptr` must have been returned by [`SlabHeap::allocate`] on this heap
    /// with the same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHeap;

impl SlabHeap for SystemHeap {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        // SAFETY: slab layouts always include the header, so they are never zero-sized.
        let ptr = unsafe { alloc::alloc(layout) };
        NonNull::new(ptr).unwrap_or_else(|| alloc::handle_alloc_error(layout))
    }

    fn try_allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: as above.
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

impl<H: SlabHeap + ?Sized> SlabHeap for &H {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        (**self).allocate(layout)
    }

    fn try_allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).try_allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

/// Bookkeeping written at the start of each slab.
pub(crate) struct SlabHeader {
    start: NonNull<u8>,
    capacity: usize,
    used: Cell<usize>,
    size: usize,
    owned: bool,
    next: Option<NonNull<SlabHeader>>,
}

impl SlabHeader {
    /// Writes a header at `base` and returns it.
    ///
    /// # Safety
    ///
    /// `base` must be aligned to `SLAB_ALIGN` and valid for writes of `size`
    /// bytes for as long as the header is in use, and `size` must be at least
    /// `HEADER_SIZE`.
    pub(crate) unsafe fn init(
        base: NonNull<u8>,
        size: usize,
        owned: bool,
        next: Option<NonNull<SlabHeader>>,
    ) -> NonNull<SlabHeader> {
        debug_assert!(size >= HEADER_SIZE);
        let header = base.cast::<SlabHeader>();
        // SAFETY: the caller guarantees `size` writable, aligned bytes at `base`.
        unsafe {
            header.as_ptr().write(SlabHeader {
                start: NonNull::new_unchecked(base.as_ptr().add(HEADER_SIZE)),
                capacity: size - HEADER_SIZE,
                used: Cell::new(0),
                size,
                owned,
                next,
            });
        }
        header
    }

    /// Carves `layout` out of the free tail of the slab, or returns `None`
    /// when it does not fit.
    pub(crate) fn bump(&self, layout: Layout) -> Option<NonNull<u8>> {
        let used = self.used.get();
        let cursor = (self.start.as_ptr() as usize).wrapping_add(used);
        let padding = cursor.wrapping_neg() & (layout.align() - 1);
        let offset = used.checked_add(padding)?;
        let end = offset.checked_add(layout.size())?;
        if end > self.capacity {
            return None;
        }
        self.used.set(end);
        // SAFETY: `offset + layout.size() <= capacity`, so the block lies inside the slab.
        Some(unsafe { NonNull::new_unchecked(self.start.as_ptr().add(offset)) })
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn used(&self) -> usize {
        self.used.get()
    }

    pub(crate) fn owned(&self) -> bool {
        self.owned
    }

    pub(crate) fn next(&self) -> Option<NonNull<SlabHeader>> {
        self.next
    }
}

pub(crate) fn try_slab_layout(size: usize) -> Option<Layout> {
    Layout::from_size_align(size, SLAB_ALIGN).ok()
}

pub(crate) fn slab_layout(size: usize) -> Layout {
    match try_slab_layout(size) {
        Some(layout) => layout,
        None => panic!("slab of {size} bytes exceeds the address space"),
    }
}

/// Size of the slab that follows one of `previous` bytes when `layout` did
/// not fit: `previous` doubled until it also holds the header, the block and
/// worst-case alignment padding.
pub(crate) fn grown_size(previous: usize, layout: Layout) -> usize {
    let needed = HEADER_SIZE
        .saturating_add(layout.size())
        .saturating_add(layout.align());
    let mut size = previous.max(1).saturating_mul(2);
    while size < needed {
        size = size.saturating_mul(2);
    }
    size
}

pub(crate) const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(1024, 8, 2048)]
    #[case(1024, 1500, 2048)]
    #[case(1024, 2048, 4096)]
    #[case(1024, 10_000, 16384)]
    fn test_grown_size_doubles(#[case] previous: usize, #[case] request: usize, #[case] expected: usize) {
        let layout = Layout::from_size_align(request, 8).unwrap();
        assert_eq!(grown_size(previous, layout), expected);
    }

    #[rstest::rstest]
    fn test_grown_size_always_exceeds_previous() {
        let layout = Layout::new::<u8>();
        assert!(grown_size(4096, layout) > 4096);
    }

    #[rstest::rstest]
    fn test_header_size_is_slab_aligned() {
        assert_eq!(HEADER_SIZE % SLAB_ALIGN, 0);
        assert!(HEADER_SIZE >= mem::size_of::<SlabHeader>());
    }

    #[rstest::rstest]
    fn test_bump_respects_alignment_and_capacity() {
        let layout = slab_layout(256);
        let base = SystemHeap.allocate(layout);
        let header = unsafe { SlabHeader::init(base, 256, true, None) };
        let slab = unsafe { header.as_ref() };

        let byte = slab.bump(Layout::new::<u8>()).unwrap();
        let word = slab.bump(Layout::new::<u64>()).unwrap();
        assert_eq!(word.as_ptr() as usize % mem::align_of::<u64>(), 0);
        assert!(word.as_ptr() as usize > byte.as_ptr() as usize);
        assert_eq!(slab.used(), 16);

        let rest = 256 - HEADER_SIZE - slab.used();
        assert!(slab.bump(Layout::from_size_align(rest + 1, 1).unwrap()).is_none());
        assert!(slab.bump(Layout::from_size_align(rest, 1).unwrap()).is_some());

        unsafe { SystemHeap.deallocate(base, layout) };
    }
}
