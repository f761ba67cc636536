//! # Accessors
//!
//! An [`Accessor<T>`] binds a record type to its computed layout and compiled
//! codec, eagerly, once. It is immutable and freely shareable: every method
//! takes `&self`, the only interior state is a memo cache of resolved path
//! handles.
//!
//! The accessor is the single entry point for typed buffer work: allocating
//! values and arrays, whole-record get/set (plain and indexed), sequence
//! views and lazy iteration, and path-based scalar access.
//!
//! Layouts containing union or sequence leaves still construct: layout
//! queries and path access work, and only the bulk codec operations report
//! `UnsupportedLayout`.

use std::marker::PhantomData;

use eyre::{bail, Result};
use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::access::codec::{compile, decode_record, encode_record, LeafOp};
use crate::access::field::FieldHandle;
use crate::access::record::Record;
use crate::access::view::{SequenceView, ValueIter};
use crate::error::Error;
use crate::layout::computed::{layout_of, ComputedLayout, LayoutKind};
use crate::layout::descriptor::TypeDescriptor;
use crate::layout::path::{parse_path, resolve};
use crate::memory::{Buffer, BufferAllocator};

pub struct Accessor<T: Record> {
    descriptor: TypeDescriptor,
    layout: ComputedLayout,
    codec: Result<Vec<LeafOp>, Error>,
    handles: Mutex<HashMap<String, FieldHandle>>,
    _value: PhantomData<fn() -> T>,
}

impl<T: Record> Accessor<T> {
    /// Compute the layout of `T` and compile its codec.
    ///
    /// Fails if the descriptor itself is invalid (bad overrides, duplicate
    /// names). A layout that is valid but not bulk-codable (union or
    /// sequence leaves) constructs fine; `get`/`set` report the stored
    /// failure instead.
    pub fn new() -> Result<Self> {
        let descriptor = T::descriptor();
        let layout = layout_of(&descriptor)?;
        let codec = compile(&layout);
        Ok(Self {
            descriptor,
            layout,
            codec,
            handles: Mutex::new(HashMap::new()),
            _value: PhantomData,
        })
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn layout(&self) -> &ComputedLayout {
        &self.layout
    }

    /// Byte distance between adjacent array elements of `T`.
    pub fn stride(&self) -> usize {
        self.layout.size
    }

    pub(crate) fn ops(&self) -> Result<&[LeafOp]> {
        match &self.codec {
            Ok(ops) => Ok(ops.as_slice()),
            Err(err) => bail!(err.clone()),
        }
    }

    /// Allocate one zeroed element.
    pub fn new_value<'a>(&self, alloc: &'a dyn BufferAllocator) -> Result<Buffer<'a>> {
        alloc.allocate(self.layout.size, self.layout.alignment)
    }

    /// Allocate one element and initialize it from `value`.
    pub fn new_value_with<'a>(
        &self,
        alloc: &'a dyn BufferAllocator,
        value: &T,
    ) -> Result<Buffer<'a>> {
        let mut buf = self.new_value(alloc)?;
        self.set(&mut buf, value)?;
        Ok(buf)
    }

    /// Allocate a zeroed array of `count` elements.
    pub fn new_array<'a>(
        &self,
        alloc: &'a dyn BufferAllocator,
        count: usize,
    ) -> Result<Buffer<'a>> {
        let size = self.layout.size.checked_mul(count).ok_or_else(|| {
            Error::capacity_exceeded(format!(
                "array of {count} elements of {} bytes overflows the address space",
                self.layout.size
            ))
        })?;
        alloc.allocate(size, self.layout.alignment)
    }

    /// Decode one element starting at offset 0.
    pub fn get(&self, buf: &Buffer<'_>) -> Result<T> {
        self.check_buffer(buf, self.layout.size)?;
        decode_record(self.ops()?, buf.as_slice(), 0)
    }

    /// Encode one element starting at offset 0.
    pub fn set(&self, buf: &mut Buffer<'_>, value: &T) -> Result<()> {
        self.check_buffer(buf, self.layout.size)?;
        encode_record(self.ops()?, buf.as_mut_slice(), 0, value)
    }

    /// Decode the element at `index` of an array buffer.
    pub fn get_at(&self, buf: &Buffer<'_>, index: usize) -> Result<T> {
        let base = self.element_base(buf, index)?;
        decode_record(self.ops()?, buf.as_slice(), base)
    }

    /// Encode the element at `index` of an array buffer.
    pub fn set_at(&self, buf: &mut Buffer<'_>, index: usize, value: &T) -> Result<()> {
        let base = self.element_base(buf, index)?;
        encode_record(self.ops()?, buf.as_mut_slice(), base, value)
    }

    /// Random-access view of the buffer as an array of `T`.
    ///
    /// The view size is `buf.len() / stride`; the buffer length must be an
    /// exact multiple of the stride.
    pub fn view<'v>(&'v self, buf: &'v mut Buffer<'_>) -> Result<SequenceView<'v, T>> {
        self.check_array_buffer(buf)?;
        let stride = self.layout.size;
        Ok(SequenceView::new(self, buf.as_mut_slice(), stride))
    }

    /// Lazy, forward-only sequence over the buffer's elements.
    ///
    /// The iterator is splittable into independent halves over disjoint
    /// index ranges.
    pub fn iter<'v>(&'v self, buf: &'v Buffer<'_>) -> Result<ValueIter<'v, T>> {
        self.check_array_buffer(buf)?;
        let stride = self.layout.size;
        Ok(ValueIter::new(self, buf.as_slice(), stride))
    }

    /// Constant byte offset of a field path.
    ///
    /// The path must not contain `[]` steps: their offset depends on an
    /// index.
    pub fn byte_offset(&self, path: &str) -> Result<usize> {
        let steps = parse_path(path)?;
        let resolved = resolve(&self.layout, &steps)?;
        if !resolved.strides.is_empty() {
            bail!(Error::invalid_argument(format!(
                "path '{path}' contains an array step; its offset depends on an index"
            )));
        }
        Ok(resolved.offset)
    }

    /// Typed handle for scalar access through a path. Memoized per accessor.
    pub fn field(&self, path: &str) -> Result<FieldHandle> {
        if let Some(handle) = self.handles.lock().get(path) {
            return Ok(handle.clone());
        }
        let steps = parse_path(path)?;
        let resolved = resolve(&self.layout, &steps)?;
        let LayoutKind::Primitive(prim) = resolved.leaf.kind else {
            bail!(Error::unsupported_layout(format!(
                "path '{path}' does not address a primitive field"
            )));
        };
        let handle = FieldHandle::new(resolved.offset, resolved.strides, prim, resolved.byte_order);
        self.handles
            .lock()
            .insert(path.to_string(), handle.clone());
        Ok(handle)
    }

    fn check_buffer(&self, buf: &Buffer<'_>, need: usize) -> Result<()> {
        if buf.len() < need {
            bail!(Error::invalid_argument(format!(
                "buffer of {} bytes is smaller than the {need}-byte layout",
                buf.len()
            )));
        }
        self.check_alignment(buf)
    }

    fn check_array_buffer(&self, buf: &Buffer<'_>) -> Result<()> {
        let stride = self.layout.size;
        if stride == 0 {
            bail!(Error::invalid_argument("element layout size cannot be zero"));
        }
        if buf.len() % stride != 0 {
            bail!(Error::invalid_argument(format!(
                "buffer size {} is not a multiple of the {stride}-byte element size",
                buf.len()
            )));
        }
        self.check_alignment(buf)
    }

    fn check_alignment(&self, buf: &Buffer<'_>) -> Result<()> {
        let align = self.layout.alignment;
        if !buf.is_empty() && buf.as_ptr() as usize % align != 0 {
            bail!(Error::invalid_argument(format!(
                "buffer at {:p} is not aligned to {align} bytes",
                buf.as_ptr()
            )));
        }
        Ok(())
    }

    fn element_base(&self, buf: &Buffer<'_>, index: usize) -> Result<usize> {
        let stride = self.layout.size;
        if stride == 0 {
            bail!(Error::invalid_argument("element layout size cannot be zero"));
        }
        self.check_alignment(buf)?;
        let end = index
            .checked_add(1)
            .and_then(|n| n.checked_mul(stride))
            .filter(|&end| end <= buf.len());
        match end {
            Some(_) => Ok(index * stride),
            None => bail!(Error::invalid_argument(format!(
                "index {index} out of range for a buffer of {} elements",
                buf.len() / stride
            ))),
        }
    }
}

impl<T: Record> std::fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor")
            .field("size", &self.layout.size)
            .field("alignment", &self.layout.alignment)
            .field("bulk_codec", &self.codec.is_ok())
            .finish()
    }
}
