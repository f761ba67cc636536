//! # Record Codecs
//!
//! A computed layout compiles into a flat **leaf program**: one
//! [`LeafOp`] per primitive field, in declaration order, carrying the
//! absolute byte offset, primitive kind, and byte order. Padding members are
//! skipped and nested structs are flattened, so whole-record encode/decode is
//! a single linear walk with no per-field dispatch beyond the primitive
//! codec.
//!
//! Union and sequence members have no position in a record walk, so layouts
//! containing them do not compile; scalar path-based access remains available
//! for those shapes.
//!
//! [`RecordReader`] and [`RecordWriter`] pair a leaf program with a byte
//! buffer and a cursor. `Record` implementations pull or push one scalar per
//! field; kind mismatches and arity drift between a record impl and its
//! descriptor surface as `InvalidLayout` instead of corrupting memory.

use eyre::{bail, Result};

use crate::access::record::{Record, Scalar};
use crate::error::Error;
use crate::layout::computed::{ComputedLayout, LayoutKind, Member};
use crate::layout::descriptor::{ByteOrder, PrimitiveType};

/// One primitive read/write of a compiled record program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LeafOp {
    pub offset: usize,
    pub prim: PrimitiveType,
    pub order: ByteOrder,
}

/// Flatten a layout into its leaf program.
///
/// Returns the typed error (not a report) so accessors can hold on to the
/// failure and raise it on each bulk-codec call.
pub(crate) fn compile(layout: &ComputedLayout) -> Result<Vec<LeafOp>, Error> {
    let mut ops = Vec::new();
    match &layout.kind {
        LayoutKind::Primitive(prim) => {
            ops.push(LeafOp {
                offset: 0,
                prim: *prim,
                order: ByteOrder::Native,
            });
        }
        LayoutKind::Struct(members) => flatten(members, 0, &mut ops)?,
        LayoutKind::Union(_) => {
            return Err(Error::unsupported_layout(
                "union layouts cannot be decoded as whole records",
            ));
        }
        LayoutKind::Array { .. } => {
            return Err(Error::unsupported_layout(
                "sequence layouts cannot be decoded as whole records",
            ));
        }
    }
    Ok(ops)
}

fn flatten(members: &[Member], base: usize, ops: &mut Vec<LeafOp>) -> Result<(), Error> {
    for member in members {
        let field = match member {
            Member::Padding(_) => continue,
            Member::Field(field) => field,
        };
        let offset = base + field.offset;
        match &field.layout.kind {
            LayoutKind::Primitive(prim) => ops.push(LeafOp {
                offset,
                prim: *prim,
                order: field.byte_order,
            }),
            LayoutKind::Struct(inner) => flatten(inner, offset, ops)?,
            LayoutKind::Union(_) => {
                return Err(Error::unsupported_layout(format!(
                    "field '{}' is a union; unions are not supported by the bulk codec",
                    field.name
                )));
            }
            LayoutKind::Array { .. } => {
                return Err(Error::unsupported_layout(format!(
                    "field '{}' is a sequence; sequences are not supported by the bulk codec",
                    field.name
                )));
            }
        }
    }
    Ok(())
}

/// Decode one whole record at `base` and verify the impl consumed every leaf.
pub(crate) fn decode_record<T: Record>(ops: &[LeafOp], data: &[u8], base: usize) -> Result<T> {
    let mut reader = RecordReader {
        data,
        base,
        ops,
        next: 0,
    };
    let value = T::read(&mut reader)?;
    if reader.next != ops.len() {
        bail!(Error::invalid_layout(format!(
            "record read {} of {} fields described by its layout",
            reader.next,
            ops.len()
        )));
    }
    Ok(value)
}

/// Encode one whole record at `base` and verify the impl produced every leaf.
pub(crate) fn encode_record<T: Record>(
    ops: &[LeafOp],
    data: &mut [u8],
    base: usize,
    value: &T,
) -> Result<()> {
    let mut writer = RecordWriter {
        data,
        base,
        ops,
        next: 0,
    };
    value.write(&mut writer)?;
    if writer.next != ops.len() {
        bail!(Error::invalid_layout(format!(
            "record wrote {} of {} fields described by its layout",
            writer.next,
            ops.len()
        )));
    }
    Ok(())
}

/// Sequential field reader handed to [`Record::read`].
pub struct RecordReader<'a> {
    data: &'a [u8],
    base: usize,
    ops: &'a [LeafOp],
    next: usize,
}

impl RecordReader<'_> {
    /// Read the next field as `S`, verifying it matches the layout.
    pub fn scalar<S: Scalar>(&mut self) -> Result<S> {
        let op = self.ops.get(self.next).copied().ok_or_else(|| {
            Error::invalid_layout("record reads more fields than its layout describes")
        })?;
        check_kind::<S>(op.prim)?;
        let start = self.base + op.offset;
        let width = op.prim.width();
        let bytes = self.data.get(start..start + width).ok_or_else(|| {
            Error::invalid_argument(format!(
                "field at bytes {start}..{} lies beyond the {}-byte buffer",
                start + width,
                self.data.len()
            ))
        })?;
        let value = S::decode(bytes, op.order)?;
        self.next += 1;
        Ok(value)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        self.scalar()
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.scalar()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.scalar()
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.scalar()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.scalar()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.scalar()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.scalar()
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.scalar()
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.scalar()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.scalar()
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.scalar()
    }
}

/// Sequential field writer handed to [`Record::write`].
pub struct RecordWriter<'a> {
    data: &'a mut [u8],
    base: usize,
    ops: &'a [LeafOp],
    next: usize,
}

impl RecordWriter<'_> {
    /// Write the next field as `S`, verifying it matches the layout.
    pub fn scalar<S: Scalar>(&mut self, value: S) -> Result<()> {
        let op = self.ops.get(self.next).copied().ok_or_else(|| {
            Error::invalid_layout("record writes more fields than its layout describes")
        })?;
        check_kind::<S>(op.prim)?;
        let start = self.base + op.offset;
        let width = op.prim.width();
        let len = self.data.len();
        let bytes = self.data.get_mut(start..start + width).ok_or_else(|| {
            Error::invalid_argument(format!(
                "field at bytes {start}..{} lies beyond the {len}-byte buffer",
                start + width,
            ))
        })?;
        value.encode(bytes, op.order)?;
        self.next += 1;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.scalar(value)
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.scalar(value)
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.scalar(value)
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.scalar(value)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.scalar(value)
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.scalar(value)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.scalar(value)
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.scalar(value)
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.scalar(value)
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.scalar(value)
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.scalar(value)
    }
}

fn check_kind<S: Scalar>(expected: PrimitiveType) -> Result<()> {
    if S::PRIMITIVE.codec_kind() != expected.codec_kind() {
        bail!(Error::invalid_layout(format!(
            "record field type {:?} does not match layout field type {:?}",
            S::PRIMITIVE,
            expected
        )));
    }
    Ok(())
}
