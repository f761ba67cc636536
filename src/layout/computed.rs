//! # Layout Engine
//!
//! [`layout_of`] turns a [`TypeDescriptor`] into a [`ComputedLayout`]: byte
//! offsets, paddings, total size, and alignment, following the same rules a
//! C compiler applies under the host's natural alignment, with the
//! descriptor's overrides taken into account.
//!
//! ## Struct algorithm (auto padding on)
//!
//! Walk fields in declaration order, tracking the running offset and the
//! maximum member alignment. Before each field, insert the padding needed to
//! reach the field's alignment (or the field's explicit `padding_before`,
//! which wins). After the last field, pad the outermost struct to a multiple
//! of its alignment so the layout tiles as an array element — unless the
//! descriptor pins `end_padding` explicitly.
//!
//! ## Invariants
//!
//! - Struct member widths (fields plus paddings) sum to `size`.
//! - `field.offset % field.alignment == 0` whenever auto padding is on or an
//!   alignment override is set.
//! - `size % alignment == 0` for auto-padded top-level structs.
//!
//! Unions place every field at offset zero (`size` = widest field,
//! `alignment` = strictest field); arrays multiply the element size by the
//! count and inherit the element alignment.

use eyre::{bail, Result};

use crate::error::Error;
use crate::layout::descriptor::{ByteOrder, FieldDescriptor, LayoutOpts, PrimitiveType, TypeDescriptor};

/// The deterministic byte-level outcome of laying out a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedLayout {
    pub size: usize,
    pub alignment: usize,
    pub kind: LayoutKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutKind {
    Primitive(PrimitiveType),
    Struct(Vec<Member>),
    /// Union fields all live at offset zero.
    Union(Vec<FieldLayout>),
    Array {
        element: Box<ComputedLayout>,
        count: usize,
    },
}

/// One entry of a struct layout, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Padding(usize),
    Field(FieldLayout),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub name: String,
    pub offset: usize,
    pub byte_order: ByteOrder,
    pub layout: ComputedLayout,
}

impl ComputedLayout {
    /// Locate a field of a struct or union layout by name.
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        match &self.kind {
            LayoutKind::Struct(members) => members.iter().find_map(|m| match m {
                Member::Field(f) if f.name == name => Some(f),
                _ => None,
            }),
            LayoutKind::Union(fields) => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, LayoutKind::Primitive(_))
    }
}

/// Compute the layout of a descriptor.
///
/// This is the outermost entry point: auto end padding applies here so the
/// result tiles as an array element. Nested structs are laid out without end
/// padding, exactly as a C compiler nests them.
pub fn layout_of(desc: &TypeDescriptor) -> Result<ComputedLayout> {
    compute(desc, true)
}

fn compute(desc: &TypeDescriptor, top_level: bool) -> Result<ComputedLayout> {
    match desc {
        TypeDescriptor::Primitive(prim) => Ok(ComputedLayout {
            size: prim.width(),
            alignment: prim.alignment(),
            kind: LayoutKind::Primitive(*prim),
        }),
        TypeDescriptor::Struct { fields, opts } => compute_struct(fields, opts, top_level),
        TypeDescriptor::Union { fields } => compute_union(fields),
        TypeDescriptor::Array { element, count } => {
            let element = compute(element, false)?;
            let size = element.size.checked_mul(*count).ok_or_else(|| {
                Error::invalid_layout(format!(
                    "array of {} elements of {} bytes overflows the address space",
                    count, element.size
                ))
            })?;
            Ok(ComputedLayout {
                size,
                alignment: element.alignment,
                kind: LayoutKind::Array {
                    element: Box::new(element),
                    count: *count,
                },
            })
        }
    }
}

fn compute_struct(
    fields: &[FieldDescriptor],
    opts: &LayoutOpts,
    top_level: bool,
) -> Result<ComputedLayout> {
    let mut offset = 0usize;
    let mut max_align = 1usize;
    let mut members = Vec::with_capacity(fields.len());

    for field in fields {
        let child = compute(&field.ty, false)?;
        let align = effective_alignment(field, &child)?;
        max_align = max_align.max(align);

        let pad = match field.opts.padding_before {
            Some(explicit) => explicit,
            None if opts.auto_padding => padding_for(align, offset),
            None => 0,
        };
        if pad > 0 {
            members.push(Member::Padding(pad));
            offset += pad;
        }

        let byte_order = effective_byte_order(field, &child)?;
        let name = field.layout_name().to_string();
        if members.iter().any(|m| matches!(m, Member::Field(f) if f.name == name)) {
            bail!(Error::invalid_layout(format!(
                "duplicate field name '{name}' in struct"
            )));
        }

        let width = child.size;
        members.push(Member::Field(FieldLayout {
            name,
            offset,
            byte_order,
            layout: child,
        }));
        offset += width;
    }

    let end_pad = match opts.end_padding {
        Some(explicit) => explicit,
        None if top_level && opts.auto_padding => padding_for(max_align, offset),
        None => 0,
    };
    if end_pad > 0 {
        members.push(Member::Padding(end_pad));
        offset += end_pad;
    }

    Ok(ComputedLayout {
        size: offset,
        alignment: max_align,
        kind: LayoutKind::Struct(members),
    })
}

fn compute_union(fields: &[FieldDescriptor]) -> Result<ComputedLayout> {
    let mut size = 0usize;
    let mut max_align = 1usize;
    let mut laid = Vec::with_capacity(fields.len());

    for field in fields {
        let child = compute(&field.ty, false)?;
        let align = effective_alignment(field, &child)?;
        max_align = max_align.max(align);
        size = size.max(child.size);

        let byte_order = effective_byte_order(field, &child)?;
        let name = field.layout_name().to_string();
        if laid.iter().any(|f: &FieldLayout| f.name == name) {
            bail!(Error::invalid_layout(format!(
                "duplicate field name '{name}' in union"
            )));
        }
        laid.push(FieldLayout {
            name,
            offset: 0,
            byte_order,
            layout: child,
        });
    }

    Ok(ComputedLayout {
        size,
        alignment: max_align,
        kind: LayoutKind::Union(laid),
    })
}

fn effective_alignment(field: &FieldDescriptor, child: &ComputedLayout) -> Result<usize> {
    match field.opts.alignment {
        Some(align) => {
            if align == 0 || !align.is_power_of_two() {
                bail!(Error::invalid_layout(format!(
                    "alignment override {} on field '{}' is not a power of two",
                    align, field.name
                )));
            }
            Ok(align)
        }
        None => Ok(child.alignment),
    }
}

fn effective_byte_order(field: &FieldDescriptor, child: &ComputedLayout) -> Result<ByteOrder> {
    if field.opts.byte_order != ByteOrder::Native && !child.is_primitive() {
        bail!(Error::invalid_layout(format!(
            "byte order can only be overridden on primitive fields, not on '{}'",
            field.name
        )));
    }
    Ok(field.opts.byte_order)
}

/// Padding needed to advance `offset` to the next multiple of `alignment`.
pub(crate) fn padding_for(alignment: usize, offset: usize) -> usize {
    let shift = offset % alignment;
    if shift == 0 {
        0
    } else {
        alignment - shift
    }
}
