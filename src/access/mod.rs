//! # Typed Buffer Access
//!
//! This module materializes typed access over raw buffers:
//!
//! - `record`: the [`Scalar`] and [`Record`] traits binding Rust values to
//!   layouts (blanket scalar impls make primitives records too).
//! - `codec`: compiled leaf programs and the [`RecordReader`] /
//!   [`RecordWriter`] walked by record impls.
//! - `accessor`: [`Accessor<T>`] — allocation, whole-record get/set, indexed
//!   access, views, iteration, and path queries, all from one immutable
//!   shareable object.
//! - `field`: [`FieldHandle`] — scalar reads/writes through a resolved path
//!   with per-array-step indices.
//! - `view`: [`SequenceView`] and the splittable [`ValueIter`].
//!
//! ## Codec contract
//!
//! Whole-record get/set walks the struct layout in member order, skipping
//! padding, honouring each primitive's byte-order tag, and recursing into
//! nested structs. Union and sequence members have no place in that walk, so
//! layouts containing them refuse the bulk codec with `UnsupportedLayout`
//! while path-based scalar access keeps working.

pub mod accessor;
pub mod codec;
pub mod field;
pub mod record;
pub mod view;


pub use accessor::Accessor;
pub use codec::{RecordReader, RecordWriter};
pub use field::FieldHandle;
pub use record::{Record, Scalar};
pub use view::{SequenceView, ValueIter};
