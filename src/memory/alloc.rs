//! # Buffer Allocators
//!
//! A [`BufferAllocator`] produces zero-initialized, aligned [`Buffer`]s.
//! Three release policies are provided:
//!
//! | Allocator | Policy | Backing |
//! |-----------|--------|---------|
//! | [`HeapAllocator`] | automatic: the buffer frees itself on drop | global allocator |
//! | [`ArenaAllocator`] | scoped: everything is released when the arena drops | `bumpalo::Bump` |
//! | [`SliceAllocator`] | slicing: stack-style carving, no free, bounded | one backing buffer |
//!
//! Containers accept `&dyn BufferAllocator`, so growth allocates a fresh
//! buffer from the same source and copies. None of the allocators track the
//! buffers they hand out; lifetimes make misuse a compile error rather than a
//! runtime one.

use std::alloc::{alloc_zeroed, Layout};
use std::cell::Cell;
use std::ptr::NonNull;

use bumpalo::Bump;
use eyre::{bail, Result};

use crate::error::Error;
use crate::memory::buffer::Buffer;

/// Factory of aligned, zeroed byte buffers.
pub trait BufferAllocator {
    /// Allocate `size` zeroed bytes aligned to `align`.
    ///
    /// `align` must be a power of two. `size == 0` returns a valid empty
    /// buffer without touching the backing store.
    fn allocate(&self, size: usize, align: usize) -> Result<Buffer<'_>>;
}

fn check_alignment(align: usize) -> Result<()> {
    if align == 0 || !align.is_power_of_two() {
        bail!(Error::invalid_argument(format!(
            "allocation alignment {align} is not a power of two"
        )));
    }
    Ok(())
}

/// Allocates out of the global allocator; each buffer frees itself when
/// dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl BufferAllocator for HeapAllocator {
    fn allocate(&self, size: usize, align: usize) -> Result<Buffer<'_>> {
        check_alignment(align)?;
        if size == 0 {
            return Ok(Buffer::empty(align));
        }
        let layout = Layout::from_size_align(size, align)
            .map_err(|_| Error::invalid_argument(format!("allocation of {size} bytes aligned to {align} exceeds the address space")))?;
        // SAFETY: layout has nonzero size.
        let raw = unsafe { alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            std::alloc::handle_alloc_error(layout);
        };
        // SAFETY: freshly allocated with exactly this layout, zeroed, unaliased.
        Ok(unsafe { Buffer::from_raw_parts(ptr, size, align, true) })
    }
}

/// Scoped allocator: buffers live exactly as long as the arena. Dropping the
/// arena releases every buffer carved from it at once.
#[derive(Default)]
pub struct ArenaAllocator {
    bump: Bump,
}

impl ArenaAllocator {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Pre-reserve `capacity` bytes in the first chunk.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
        }
    }

    /// Total bytes handed to this arena by the global allocator.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl BufferAllocator for ArenaAllocator {
    fn allocate(&self, size: usize, align: usize) -> Result<Buffer<'_>> {
        check_alignment(align)?;
        if size == 0 {
            return Ok(Buffer::empty(align));
        }
        let layout = Layout::from_size_align(size, align)
            .map_err(|_| Error::invalid_argument(format!("allocation of {size} bytes aligned to {align} exceeds the address space")))?;
        let ptr = self.bump.alloc_layout(layout);
        // SAFETY: the bump region is valid for the arena's lifetime and this
        // range was just carved, so it is unaliased; zeroing makes it
        // initialized.
        unsafe {
            ptr.as_ptr().write_bytes(0, size);
            Ok(Buffer::from_raw_parts(ptr, size, align, false))
        }
    }
}

impl std::fmt::Debug for ArenaAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaAllocator")
            .field("allocated_bytes", &self.bump.allocated_bytes())
            .finish()
    }
}

/// Slicing allocator: carves aligned sub-buffers out of one backing region,
/// stack style. There is no free operation; exhausting the region fails with
/// `CapacityExceeded`.
#[derive(Debug)]
pub struct SliceAllocator<'region> {
    region: Buffer<'region>,
    used: Cell<usize>,
}

impl<'region> SliceAllocator<'region> {
    /// Take ownership of `region` and carve from its start.
    pub fn new(region: Buffer<'region>) -> Self {
        Self {
            region,
            used: Cell::new(0),
        }
    }

    pub fn used(&self) -> usize {
        self.used.get()
    }

    pub fn remaining(&self) -> usize {
        self.region.len() - self.used.get()
    }
}

impl BufferAllocator for SliceAllocator<'_> {
    fn allocate(&self, size: usize, align: usize) -> Result<Buffer<'_>> {
        check_alignment(align)?;
        if size == 0 {
            return Ok(Buffer::empty(align));
        }

        let base = self.region.as_ptr() as usize;
        let cursor = base + self.used.get();
        let aligned = cursor
            .checked_add(align - 1)
            .map(|c| c & !(align - 1))
            .filter(|&start| start + size <= base + self.region.len());
        let Some(start) = aligned else {
            bail!(Error::capacity_exceeded(format!(
                "slice allocator exhausted: {} of {} bytes used, cannot carve {} aligned to {}",
                self.used.get(),
                self.region.len(),
                size,
                align
            )));
        };

        self.used.set(start + size - base);
        // SAFETY: [start, start + size) lies inside the backing region, past
        // every previously carved range (the cursor only moves forward), so
        // the new buffer is unaliased. The region outlives &self. Zeroing
        // keeps the zero-fill contract even for recycled backing memory.
        unsafe {
            let ptr = NonNull::new_unchecked(start as *mut u8);
            ptr.as_ptr().write_bytes(0, size);
            Ok(Buffer::from_raw_parts(ptr, size, align, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_buffers_are_zeroed_and_aligned() {
        let alloc = HeapAllocator;
        let buf = alloc.allocate(64, 16).unwrap();
        assert_eq!(buf.len(), 64);
        assert_eq!(buf.alignment(), 16);
        assert_eq!(buf.as_ptr() as usize % 16, 0);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn heap_zero_size_allocation_is_empty() {
        let alloc = HeapAllocator;
        let buf = alloc.allocate(0, 8).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.alignment(), 8);
    }

    #[test]
    fn non_power_of_two_alignment_is_rejected() {
        let alloc = HeapAllocator;
        let err = alloc.allocate(8, 3).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::error::Error>(),
            Some(crate::error::Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn heap_buffer_is_writable() {
        let alloc = HeapAllocator;
        let mut buf = alloc.allocate(8, 8).unwrap();
        buf.as_mut_slice()[0] = 0xAB;
        buf.as_mut_slice()[7] = 0xCD;
        assert_eq!(buf.as_slice()[0], 0xAB);
        assert_eq!(buf.as_slice()[7], 0xCD);
    }

    #[test]
    fn arena_buffers_are_zeroed_aligned_and_disjoint() {
        let arena = ArenaAllocator::new();
        let a = arena.allocate(16, 8).unwrap();
        let b = arena.allocate(16, 8).unwrap();
        assert_eq!(a.as_ptr() as usize % 8, 0);
        assert_eq!(b.as_ptr() as usize % 8, 0);
        assert!(a.as_slice().iter().all(|&x| x == 0));

        let a_range = a.as_ptr() as usize..a.as_ptr() as usize + a.len();
        assert!(!a_range.contains(&(b.as_ptr() as usize)));
    }

    #[test]
    fn slice_allocator_carves_and_reports_usage() {
        let heap = HeapAllocator;
        let region = heap.allocate(64, 8).unwrap();
        let slab = SliceAllocator::new(region);

        let first = slab.allocate(10, 1).unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(slab.used(), 10);

        // Next carve must skip ahead to an 8-byte boundary.
        let second = slab.allocate(8, 8).unwrap();
        assert_eq!(second.as_ptr() as usize % 8, 0);
        assert_eq!(slab.used(), 24);
        assert_eq!(slab.remaining(), 40);
    }

    #[test]
    fn slice_allocator_exhaustion_is_capacity_exceeded() {
        let heap = HeapAllocator;
        let region = heap.allocate(16, 8).unwrap();
        let slab = SliceAllocator::new(region);

        slab.allocate(12, 1).unwrap();
        let err = slab.allocate(8, 1).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::error::Error>(),
            Some(crate::error::Error::CapacityExceeded(_))
        ));
        // Failed carve leaves the cursor untouched.
        assert_eq!(slab.used(), 12);
        slab.allocate(4, 1).unwrap();
    }

    #[test]
    fn slice_allocator_zeroes_recycled_backing_bytes() {
        let heap = HeapAllocator;
        let mut region = heap.allocate(32, 8).unwrap();
        region.as_mut_slice().fill(0xFF);
        let slab = SliceAllocator::new(region);
        let buf = slab.allocate(16, 8).unwrap();
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }
}
