//! # Typed Field Handles
//!
//! A [`FieldHandle`] is the compiled form of a path: a constant base offset,
//! one stride per `[]` step, and the primitive kind and byte order of the
//! addressed leaf. Given a buffer and one index per array step it reads or
//! writes the scalar in place, with bounds and kind checks but no record
//! materialization.

use eyre::{bail, Result};
use smallvec::SmallVec;

use crate::access::record::Scalar;
use crate::error::Error;
use crate::layout::descriptor::{ByteOrder, PrimitiveType};
use crate::memory::Buffer;

#[derive(Debug, Clone)]
pub struct FieldHandle {
    base: usize,
    strides: SmallVec<[usize; 2]>,
    prim: PrimitiveType,
    order: ByteOrder,
}

impl FieldHandle {
    pub(crate) fn new(
        base: usize,
        strides: SmallVec<[usize; 2]>,
        prim: PrimitiveType,
        order: ByteOrder,
    ) -> Self {
        Self {
            base,
            strides,
            prim,
            order,
        }
    }

    /// Number of indices a read or write expects (one per `[]` step).
    pub fn index_arity(&self) -> usize {
        self.strides.len()
    }

    pub fn primitive(&self) -> PrimitiveType {
        self.prim
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Byte offset of the addressed scalar for the given indices.
    pub fn byte_offset(&self, indices: &[usize]) -> Result<usize> {
        if indices.len() != self.strides.len() {
            bail!(Error::invalid_argument(format!(
                "path expects {} indices, got {}",
                self.strides.len(),
                indices.len()
            )));
        }
        let mut offset = self.base;
        for (index, stride) in indices.iter().zip(&self.strides) {
            offset = index
                .checked_mul(*stride)
                .and_then(|delta| offset.checked_add(delta))
                .ok_or_else(|| {
                    Error::invalid_argument(format!("index {index} overflows the address space"))
                })?;
        }
        Ok(offset)
    }

    /// Read the addressed scalar.
    pub fn get<S: Scalar>(&self, buf: &Buffer<'_>, indices: &[usize]) -> Result<S> {
        self.check_kind::<S>()?;
        let offset = self.byte_offset(indices)?;
        let width = self.prim.width();
        let bytes = buf.as_slice().get(offset..offset + width).ok_or_else(|| {
            Error::invalid_argument(format!(
                "field at bytes {offset}..{} lies beyond the {}-byte buffer",
                offset + width,
                buf.len()
            ))
        })?;
        S::decode(bytes, self.order)
    }

    /// Write the addressed scalar.
    pub fn set<S: Scalar>(&self, buf: &mut Buffer<'_>, indices: &[usize], value: S) -> Result<()> {
        self.check_kind::<S>()?;
        let offset = self.byte_offset(indices)?;
        let width = self.prim.width();
        let len = buf.len();
        let bytes = buf
            .as_mut_slice()
            .get_mut(offset..offset + width)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "field at bytes {offset}..{} lies beyond the {len}-byte buffer",
                    offset + width,
                ))
            })?;
        value.encode(bytes, self.order)
    }

    fn check_kind<S: Scalar>(&self) -> Result<()> {
        if S::PRIMITIVE.codec_kind() != self.prim.codec_kind() {
            bail!(Error::invalid_argument(format!(
                "requested {:?} access to a {:?} field",
                S::PRIMITIVE,
                self.prim
            )));
        }
        Ok(())
    }
}
