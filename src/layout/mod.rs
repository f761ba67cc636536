//! # Layout Computation
//!
//! This module turns descriptions of composite values into deterministic
//! byte-level layouts, and resolves compact path strings against them.
//!
//! ## Components
//!
//! - `descriptor`: [`TypeDescriptor`] trees with per-field overrides
//!   (alignment, explicit padding, byte order, rename) and per-struct
//!   options (auto padding, end padding).
//! - `computed`: the layout engine — [`layout_of`] produces a
//!   [`ComputedLayout`] with member offsets, paddings, total size, and
//!   alignment matching C struct packing rules.
//! - `path`: the `.field` / `[]` path grammar and its resolution to offsets,
//!   strides, and leaf layouts.
//!
//! ## Layout rules at a glance
//!
//! | Shape | Size | Alignment |
//! |-------|------|-----------|
//! | Primitive | width (1/2/4/8) | width |
//! | Struct (auto) | fields + paddings, end-padded to alignment at top level | max member alignment |
//! | Struct (packed) | fields back to back (+ explicit paddings) | max member alignment |
//! | Union | widest field | strictest field |
//! | Array | element size × count | element alignment |

pub mod computed;
pub mod descriptor;
pub mod path;


pub use computed::{layout_of, ComputedLayout, FieldLayout, LayoutKind, Member};
pub use descriptor::{
    ByteOrder, FieldDescriptor, FieldOpts, LayoutOpts, PrimitiveType, TypeDescriptor,
};
pub use path::{parse_path, PathStep};
