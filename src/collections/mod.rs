//! # Value-Semantics Collections
//!
//! Containers that store their elements as bytes in one contiguous buffer,
//! laid out by the layout engine, instead of as references to heap objects:
//!
//! - [`ValueVec`]: growable contiguous sequence with indexed access and
//!   amortized O(1) push.
//! - [`ValueMap`]: open-addressed hash table with linear probing, tombstone
//!   deletes, and rehash at half occupancy.
//!
//! Both take any [`BufferAllocator`](crate::memory::BufferAllocator) and
//! keep every element bit-pattern intact across growth — resizing copies
//! bytes, never re-encodes.
//!
//! Containers are single-mutator: no operation suspends, nothing is atomic,
//! and concurrent mutation is not policed. Concurrent readers of a
//! container nobody mutates are safe.

mod map;
mod vec;


pub use map::{Entries, MapCursor, ValueMap};
pub use vec::ValueVec;
