//! # Memory Management
//!
//! Raw storage for projected values: aligned zero-initialized [`Buffer`]s
//! and the [`BufferAllocator`] implementations that produce them.
//!
//! ## Release policies
//!
//! - **Automatic** ([`HeapAllocator`]): each buffer owns its allocation and
//!   frees it on drop.
//! - **Scoped** ([`ArenaAllocator`]): buffers borrow from a bump arena and
//!   are all released when the arena drops.
//! - **Slicing** ([`SliceAllocator`]): buffers are carved stack-style from a
//!   fixed backing region; there is no free, and exhaustion is an error.
//!
//! Containers and accessors are allocator-agnostic: anything implementing
//! [`BufferAllocator`] works, and container growth simply allocates again
//! from the same source and copies.

mod alloc;
mod buffer;

pub use alloc::{ArenaAllocator, BufferAllocator, HeapAllocator, SliceAllocator};
pub use buffer::Buffer;
