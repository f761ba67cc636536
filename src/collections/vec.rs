//! # Specialized Sequence
//!
//! [`ValueVec`] is a growable array that stores its elements as bytes in one
//! contiguous buffer instead of as references to heap objects. Elements are
//! laid out at `index * stride` using the element type's computed layout, so
//! a `ValueVec<Point>` is bit-compatible with a C `Point[]`.
//!
//! ## Capacity
//!
//! Capacity is always a power of two and at least 2, derived from the
//! presize hint as `max(2, next_power_of_two(presize))`. A full vector
//! doubles: allocate a fresh zeroed buffer from the same allocator, copy the
//! live prefix bit-exactly, drop the old buffer. Growth past `i32::MAX`
//! elements fails with `CapacityExceeded` before any state changes.
//!
//! ## Equality
//!
//! Two vectors of the same element type compare by length and then by a
//! straight byte comparison of their live prefixes. Allocation zero-fills
//! and the codec never writes padding, so equal element sequences have equal
//! bytes.
//!
//! One mutator at a time; concurrent readers of a vector nobody mutates are
//! safe.

use eyre::{bail, Result};

use crate::access::accessor::Accessor;
use crate::access::record::Record;
use crate::access::view::ValueIter;
use crate::error::Error;
use crate::memory::{Buffer, BufferAllocator};

/// Containers index with signed 32-bit sizes at the contract level.
pub(crate) const MAX_ELEMENTS: usize = i32::MAX as usize;

/// Capacity from a presize hint: power of two, at least 2.
pub(crate) fn capacity_for(presize: usize) -> Result<usize> {
    let capacity = presize.next_power_of_two().max(2);
    if capacity > MAX_ELEMENTS {
        bail!(Error::capacity_exceeded(format!(
            "presize {presize} exceeds the {MAX_ELEMENTS}-element limit"
        )));
    }
    Ok(capacity)
}

pub struct ValueVec<'alloc, T: Record> {
    alloc: &'alloc dyn BufferAllocator,
    access: Accessor<T>,
    buf: Buffer<'alloc>,
    len: usize,
}

impl<'alloc, T: Record> ValueVec<'alloc, T> {
    /// An empty vector with the default presize of 16.
    pub fn new(alloc: &'alloc dyn BufferAllocator) -> Result<Self> {
        Self::with_capacity(alloc, 16)
    }

    /// An empty vector sized for `presize` elements up front.
    pub fn with_capacity(alloc: &'alloc dyn BufferAllocator, presize: usize) -> Result<Self> {
        let access = Accessor::new()?;
        if access.stride() == 0 {
            bail!(Error::invalid_argument("element layout size cannot be zero"));
        }
        let capacity = capacity_for(presize)?;
        let buf = access.new_array(alloc, capacity)?;
        Ok(Self {
            alloc,
            access,
            buf,
            len: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len() / self.access.stride()
    }

    pub fn accessor(&self) -> &Accessor<T> {
        &self.access
    }

    /// Decode the element at `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        self.check_index(index)?;
        self.access.get_at(&self.buf, index)
    }

    /// Overwrite the element at `index`, returning the previous element.
    pub fn set(&mut self, index: usize, value: &T) -> Result<T> {
        self.check_index(index)?;
        let old = self.access.get_at(&self.buf, index)?;
        self.access.set_at(&mut self.buf, index, value)?;
        Ok(old)
    }

    /// Append an element, growing if full. Amortized O(1).
    pub fn push(&mut self, value: &T) -> Result<()> {
        if self.len == self.capacity() {
            self.grow()?;
        }
        self.access.set_at(&mut self.buf, self.len, value)?;
        self.len += 1;
        Ok(())
    }

    /// Insert an element at `index`, shifting `[index, len)` right. O(n).
    pub fn insert(&mut self, index: usize, value: &T) -> Result<()> {
        if index > self.len {
            bail!(Error::invalid_argument(format!(
                "insert index {index} out of range for a vector of {} elements",
                self.len
            )));
        }
        if self.len == self.capacity() {
            self.grow()?;
        }
        let stride = self.access.stride();
        self.buf
            .as_mut_slice()
            .copy_within(index * stride..self.len * stride, (index + 1) * stride);
        self.access.set_at(&mut self.buf, index, value)?;
        self.len += 1;
        Ok(())
    }

    /// Remove and return the element at `index`, shifting `(index, len)`
    /// left. O(n).
    pub fn remove(&mut self, index: usize) -> Result<T> {
        self.check_index(index)?;
        let value = self.access.get_at(&self.buf, index)?;
        let stride = self.access.stride();
        self.buf
            .as_mut_slice()
            .copy_within((index + 1) * stride..self.len * stride, index * stride);
        self.len -= 1;
        Ok(value)
    }

    /// Lazy iterator over the live elements.
    pub fn iter(&self) -> ValueIter<'_, T> {
        let stride = self.access.stride();
        ValueIter::new(&self.access, &self.buf.as_slice()[..self.len * stride], stride)
    }

    fn grow(&mut self) -> Result<()> {
        let capacity = self.capacity();
        let doubled = capacity.checked_mul(2).filter(|&c| c <= MAX_ELEMENTS);
        let Some(new_capacity) = doubled else {
            bail!(Error::capacity_exceeded(format!(
                "growing past {capacity} elements exceeds the {MAX_ELEMENTS}-element limit"
            )));
        };
        let stride = self.access.stride();
        let mut grown = self.access.new_array(self.alloc, new_capacity)?;
        grown.as_mut_slice()[..self.len * stride]
            .copy_from_slice(&self.buf.as_slice()[..self.len * stride]);
        self.buf = grown;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len {
            bail!(Error::invalid_argument(format!(
                "index {index} out of range for a vector of {} elements",
                self.len
            )));
        }
        Ok(())
    }
}

impl<T: Record> PartialEq for ValueVec<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        let bytes = self.len * self.access.stride();
        self.buf.as_slice()[..bytes] == other.buf.as_slice()[..bytes]
    }
}

impl<T: Record> std::fmt::Debug for ValueVec<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueVec")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("stride", &self.access.stride())
            .finish()
    }
}
