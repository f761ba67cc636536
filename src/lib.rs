//! # memlay - Struct Layout Projection over Raw Memory
//!
//! memlay projects user-defined composite value types onto raw byte buffers
//! and provides containers whose elements live contiguously in such buffers
//! rather than as references to heap objects. Layouts follow the rules a C
//! compiler would apply, with user-overridable knobs.
//!
//! ## Quick Start
//!
//! ```ignore
//! use memlay::{record, Accessor, HeapAllocator, ValueVec};
//!
//! record! {
//!     pub struct Point {
//!         x: i32,
//!         y: i32,
//!     }
//! }
//!
//! let alloc = HeapAllocator;
//! let access = Accessor::<Point>::new()?;
//! assert_eq!(access.layout().size, 8);
//! assert_eq!(access.byte_offset(".y")?, 4);
//!
//! let buf = access.new_value_with(&alloc, &Point { x: 1, y: 2 })?;
//! assert_eq!(access.get(&buf)?, Point { x: 1, y: 2 });
//!
//! let mut points = ValueVec::<Point>::new(&alloc)?;
//! points.push(&Point { x: 3, y: 4 })?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │   Collections (ValueVec / ValueMap)         │
//! ├─────────────────────────────────────────────┤
//! │   Access (Accessor, codecs, views, paths)   │
//! ├──────────────────────┬──────────────────────┤
//! │   Layout Engine      │   Memory (Buffer,    │
//! │   (descriptors,      │   Heap/Arena/Slice   │
//! │    offsets, paths)   │   allocators)        │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! A [`TypeDescriptor`] describes a composite value; the layout engine turns
//! it into a [`ComputedLayout`] (offsets, paddings, size, alignment). An
//! [`Accessor`] binds a [`Record`] type to its layout and compiled codec and
//! mediates all typed buffer access. The collections use the same machinery
//! to keep whole element sequences, or `{hash, key, value}` hash slots, in
//! single buffers.
//!
//! ## Design Principles
//!
//! - **C-compatible layouts**: auto padding reproduces C struct packing;
//!   every knob (alignment, explicit padding, byte order, end padding) is a
//!   per-descriptor override, not a global mode.
//! - **Zero re-encoding**: container growth and rehashing copy element bytes
//!   verbatim; values round-trip bit-exactly.
//! - **Monomorphized codecs**: layouts compile to flat leaf programs walked
//!   by generic record impls; there is no runtime code generation and no
//!   reflection.
//! - **Allocator pluggability**: automatic (heap), scoped (arena), and
//!   slicing allocators share one trait; containers grow through whatever
//!   they were built with.
//!
//! ## Concurrency Model
//!
//! Everything is synchronous and bounded; nothing blocks or yields.
//! Accessors are immutable and freely shareable. Containers have exactly one
//! mutator at a time; `mod_count` interference detection exists for detached
//! cursors, not thread safety.
//!
//! ## Module Overview
//!
//! - [`layout`]: descriptors, the layout engine, path parsing/resolution
//! - [`memory`]: aligned buffers and the three allocators
//! - [`access`]: record binding, codecs, accessors, views, field handles
//! - [`collections`]: the specialized sequence and map
//! - [`error`]: the typed error taxonomy

#[macro_use]
mod macros;

pub mod access;
pub mod collections;
pub mod error;
pub mod layout;
pub mod memory;

pub use access::{Accessor, FieldHandle, Record, RecordReader, RecordWriter, Scalar, SequenceView, ValueIter};
pub use collections::{MapCursor, ValueMap, ValueVec};
pub use error::Error;
pub use layout::{
    layout_of, parse_path, ByteOrder, ComputedLayout, FieldDescriptor, FieldLayout, LayoutKind,
    LayoutOpts, Member, PathStep, PrimitiveType, TypeDescriptor,
};
pub use memory::{ArenaAllocator, Buffer, BufferAllocator, HeapAllocator, SliceAllocator};
