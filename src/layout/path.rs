//! # Path Parsing and Resolution
//!
//! A path is a compact string addressing a value inside a layout:
//! `.name` selects a struct or union member, `[]` indexes into an array.
//! Atoms concatenate, so `"[].point.x"` means "for each element, the `x`
//! member of the `point` member".
//!
//! ## Grammar
//!
//! ```text
//! path := step+
//! step := "." ident | "[]"
//! ident := [A-Za-z_][A-Za-z0-9_]*
//! ```
//!
//! Parsing is strict: any character outside the grammar is a parse error,
//! including a path that does not begin with `.` or `[]`.
//!
//! ## Resolution
//!
//! Resolution walks the computed layout, accumulating a constant byte offset
//! for field steps and one stride per array step. A leading `[]` on a
//! non-array root addresses the buffer as an array *of the root layout*
//! (stride = root size), so `"[].x"` works on a plain struct accessor over
//! an array buffer. Every later `[]` must land on an actual array layout.

use eyre::{bail, Result};
use smallvec::SmallVec;

use crate::error::Error;
use crate::layout::computed::{ComputedLayout, LayoutKind};
use crate::layout::descriptor::ByteOrder;

/// One navigation step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Field(String),
    Array,
}

/// Parse a path string into its steps.
pub fn parse_path(path: &str) -> Result<SmallVec<[PathStep; 4]>> {
    let bytes = path.as_bytes();
    if bytes.is_empty() {
        bail!(Error::parse("empty path"));
    }

    let mut steps = SmallVec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'.' => {
                let start = pos + 1;
                let mut end = start;
                while end < bytes.len() && is_ident_byte(bytes[end], end == start) {
                    end += 1;
                }
                if end == start {
                    bail!(Error::parse(format!(
                        "expected identifier after '.' at offset {pos} in '{path}'"
                    )));
                }
                // Parser byte walk stays on char boundaries: idents are ASCII.
                steps.push(PathStep::Field(path[start..end].to_string()));
                pos = end;
            }
            b'[' => {
                if bytes.get(pos + 1) != Some(&b']') {
                    bail!(Error::parse(format!(
                        "expected ']' after '[' at offset {pos} in '{path}'"
                    )));
                }
                steps.push(PathStep::Array);
                pos += 2;
            }
            other => {
                bail!(Error::parse(format!(
                    "expected '.' or '[]' at offset {pos} in '{path}', found '{}'",
                    other as char
                )));
            }
        }
    }
    Ok(steps)
}

fn is_ident_byte(b: u8, first: bool) -> bool {
    b == b'_' || b.is_ascii_alphabetic() || (!first && b.is_ascii_digit())
}

/// What a fully resolved path addresses.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedPath {
    /// Sum of the constant member offsets along the walk.
    pub offset: usize,
    /// One stride per array step, outermost first.
    pub strides: SmallVec<[usize; 2]>,
    /// Byte order of the final member (native when the walk ends on an
    /// array element or the root itself).
    pub byte_order: ByteOrder,
    /// Layout of the addressed value.
    pub leaf: ComputedLayout,
}

/// Walk `steps` against `root`, producing the addressed offset/strides/leaf.
pub(crate) fn resolve(root: &ComputedLayout, steps: &[PathStep]) -> Result<ResolvedPath> {
    let mut current = root;
    let mut offset = 0usize;
    let mut strides: SmallVec<[usize; 2]> = SmallVec::new();
    let mut byte_order = ByteOrder::Native;

    for (index, step) in steps.iter().enumerate() {
        match step {
            PathStep::Array => match &current.kind {
                LayoutKind::Array { element, .. } => {
                    strides.push(element.size);
                    byte_order = ByteOrder::Native;
                    current = element;
                }
                // A leading [] treats the buffer as an array of the root
                // layout itself.
                _ if index == 0 => {
                    strides.push(root.size);
                }
                _ => {
                    bail!(Error::not_found(format!(
                        "path step {} is '[]' but the addressed layout is not an array",
                        index
                    )));
                }
            },
            PathStep::Field(name) => {
                let field = current.field(name).ok_or_else(|| {
                    Error::not_found(format!("no member named '{name}' in layout"))
                })?;
                offset += field.offset;
                byte_order = field.byte_order;
                current = &field.layout;
            }
        }
    }

    Ok(ResolvedPath {
        offset,
        strides,
        byte_order,
        leaf: current.clone(),
    })
}
