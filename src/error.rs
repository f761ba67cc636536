//! # Error Taxonomy
//!
//! Every failure this crate can surface is one of the [`Error`] kinds below.
//! Operations return `eyre::Result`, so callers that only want a message can
//! print the report, while callers that branch on the kind can
//! `downcast_ref::<Error>()`.
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `InvalidArgument` | Out-of-range index, misaligned or undersized buffer, non-power-of-two allocation alignment, index-dependent offset query |
//! | `InvalidLayout` | Byte-order override on a non-primitive field, non-power-of-two alignment override, duplicate member names, descriptor/codec mismatch |
//! | `UnsupportedLayout` | Bulk get/set on a layout with union or sequence leaves, typed field access to a non-primitive leaf |
//! | `CapacityExceeded` | Container growth past `i32::MAX` elements, slicing allocator exhaustion |
//! | `ConcurrentModification` | Cursor detects a structural mutation it did not perform |
//! | `Parse` | Malformed path string |
//! | `NotFound` | Path names a member the layout does not have |
//!
//! A failed operation never mutates container state: every precondition is
//! checked before the first write.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidArgument(String),
    InvalidLayout(String),
    UnsupportedLayout(String),
    CapacityExceeded(String),
    ConcurrentModification,
    Parse(String),
    NotFound(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn invalid_layout(msg: impl Into<String>) -> Self {
        Error::InvalidLayout(msg.into())
    }

    pub fn unsupported_layout(msg: impl Into<String>) -> Self {
        Error::UnsupportedLayout(msg.into())
    }

    pub fn capacity_exceeded(msg: impl Into<String>) -> Self {
        Error::CapacityExceeded(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::InvalidLayout(msg) => write!(f, "invalid layout: {msg}"),
            Error::UnsupportedLayout(msg) => write!(f, "unsupported layout: {msg}"),
            Error::CapacityExceeded(msg) => write!(f, "capacity exceeded: {msg}"),
            Error::ConcurrentModification => {
                write!(f, "concurrent modification detected during iteration")
            }
            Error::Parse(msg) => write!(f, "path parse error: {msg}"),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
