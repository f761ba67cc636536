//! # Value Binding
//!
//! Two traits connect Rust values to computed layouts:
//!
//! - [`Scalar`] is implemented once per primitive and knows how to encode and
//!   decode itself for a given byte order.
//! - [`Record`] describes a composite value: its [`TypeDescriptor`] plus
//!   `read`/`write` hooks that consume and produce fields **in declaration
//!   order** against a compiled leaf program. A blanket impl makes every
//!   scalar a single-field record, so primitives work directly as container
//!   elements and map keys.
//!
//! Struct impls are mechanical; the [`record!`](crate::record) macro writes
//! them for the common case:
//!
//! ```ignore
//! record! {
//!     pub struct Point {
//!         x: i32,
//!         y: i32,
//!     }
//! }
//! ```
//!
//! Layout overrides (alignment, explicit padding, byte order, renames) need a
//! manual impl built with the [`FieldDescriptor`] builder methods; the
//! `read`/`write` bodies stay the same shape.
//!
//! [`FieldDescriptor`]: crate::layout::FieldDescriptor

use eyre::{bail, Result};

use crate::access::codec::{RecordReader, RecordWriter};
use crate::error::Error;
use crate::layout::descriptor::{ByteOrder, PrimitiveType, TypeDescriptor};

/// A primitive value with a fixed width and a byte-order-aware codec.
pub trait Scalar: Copy + PartialEq + std::fmt::Debug {
    const PRIMITIVE: PrimitiveType;

    /// Decode from exactly `PRIMITIVE.width()` bytes.
    fn decode(bytes: &[u8], order: ByteOrder) -> Result<Self>;

    /// Encode into exactly `PRIMITIVE.width()` bytes.
    fn encode(self, bytes: &mut [u8], order: ByteOrder) -> Result<()>;
}

macro_rules! impl_scalar {
    ($($ty:ty => $prim:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const PRIMITIVE: PrimitiveType = PrimitiveType::$prim;

                fn decode(bytes: &[u8], order: ByteOrder) -> Result<Self> {
                    let raw = bytes.try_into().map_err(|_| {
                        Error::invalid_argument(format!(
                            "expected {} bytes for {}, got {}",
                            std::mem::size_of::<$ty>(),
                            stringify!($ty),
                            bytes.len()
                        ))
                    })?;
                    Ok(match order {
                        ByteOrder::Native => <$ty>::from_ne_bytes(raw),
                        ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
                        ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
                    })
                }

                fn encode(self, bytes: &mut [u8], order: ByteOrder) -> Result<()> {
                    let raw = match order {
                        ByteOrder::Native => self.to_ne_bytes(),
                        ByteOrder::LittleEndian => self.to_le_bytes(),
                        ByteOrder::BigEndian => self.to_be_bytes(),
                    };
                    if bytes.len() != raw.len() {
                        bail!(Error::invalid_argument(format!(
                            "expected {} bytes for {}, got {}",
                            raw.len(),
                            stringify!($ty),
                            bytes.len()
                        )));
                    }
                    bytes.copy_from_slice(&raw);
                    Ok(())
                }
            }
        )*
    };
}

impl_scalar! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl Scalar for bool {
    const PRIMITIVE: PrimitiveType = PrimitiveType::Bool;

    fn decode(bytes: &[u8], _order: ByteOrder) -> Result<Self> {
        let byte = bytes
            .first()
            .ok_or_else(|| Error::invalid_argument("expected 1 byte for bool, got 0"))?;
        Ok(*byte != 0)
    }

    fn encode(self, bytes: &mut [u8], _order: ByteOrder) -> Result<()> {
        let byte = bytes
            .first_mut()
            .ok_or_else(|| Error::invalid_argument("expected 1 byte for bool, got 0"))?;
        *byte = self as u8;
        Ok(())
    }
}

/// A composite value that can be projected onto a laid-out buffer.
///
/// `read` and `write` must visit fields in declaration order, matching the
/// descriptor; the reader/writer verify kind and arity against the compiled
/// layout and report drift as `InvalidLayout`.
pub trait Record: Sized {
    fn descriptor() -> TypeDescriptor;

    fn read(reader: &mut RecordReader<'_>) -> Result<Self>;

    fn write(&self, writer: &mut RecordWriter<'_>) -> Result<()>;
}

impl<S: Scalar> Record for S {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Primitive(S::PRIMITIVE)
    }

    fn read(reader: &mut RecordReader<'_>) -> Result<Self> {
        reader.scalar()
    }

    fn write(&self, writer: &mut RecordWriter<'_>) -> Result<()> {
        writer.scalar(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<S: Scalar>(value: S, order: ByteOrder) -> S {
        let mut bytes = vec![0u8; S::PRIMITIVE.width()];
        value.encode(&mut bytes, order).unwrap();
        S::decode(&bytes, order).unwrap()
    }

    #[test]
    fn integers_round_trip_in_every_order() {
        for order in [
            ByteOrder::Native,
            ByteOrder::LittleEndian,
            ByteOrder::BigEndian,
        ] {
            assert_eq!(round_trip(i8::MIN, order), i8::MIN);
            assert_eq!(round_trip(u8::MAX, order), u8::MAX);
            assert_eq!(round_trip(i16::MIN, order), i16::MIN);
            assert_eq!(round_trip(u16::MAX, order), u16::MAX);
            assert_eq!(round_trip(-123_456_789i32, order), -123_456_789);
            assert_eq!(round_trip(u32::MAX, order), u32::MAX);
            assert_eq!(round_trip(i64::MIN + 1, order), i64::MIN + 1);
            assert_eq!(round_trip(u64::MAX - 7, order), u64::MAX - 7);
        }
    }

    #[test]
    fn floats_round_trip_bit_exactly() {
        for order in [
            ByteOrder::Native,
            ByteOrder::LittleEndian,
            ByteOrder::BigEndian,
        ] {
            assert_eq!(round_trip(f32::MIN_POSITIVE, order), f32::MIN_POSITIVE);
            assert_eq!(round_trip(-0.0f64, order).to_bits(), (-0.0f64).to_bits());
            assert_eq!(round_trip(f64::INFINITY, order), f64::INFINITY);
        }
    }

    #[test]
    fn big_endian_encoding_reverses_bytes() {
        let mut le = [0u8; 4];
        let mut be = [0u8; 4];
        0x0102_0304u32
            .encode(&mut le, ByteOrder::LittleEndian)
            .unwrap();
        0x0102_0304u32.encode(&mut be, ByteOrder::BigEndian).unwrap();
        assert_eq!(le, [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(be, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn bool_decodes_any_nonzero_byte_as_true() {
        assert!(!bool::decode(&[0], ByteOrder::Native).unwrap());
        assert!(bool::decode(&[1], ByteOrder::Native).unwrap());
        assert!(bool::decode(&[0xFF], ByteOrder::Native).unwrap());

        let mut byte = [0xABu8];
        true.encode(&mut byte, ByteOrder::Native).unwrap();
        assert_eq!(byte, [1]);
        false.encode(&mut byte, ByteOrder::Native).unwrap();
        assert_eq!(byte, [0]);
    }

    #[test]
    fn wrong_width_slices_are_rejected() {
        assert!(i32::decode(&[0, 0], ByteOrder::Native).is_err());
        assert!(i32::decode(&[0; 8], ByteOrder::Native).is_err());
        let mut short = [0u8; 2];
        assert!(7i32.encode(&mut short, ByteOrder::Native).is_err());
        assert!(bool::decode(&[], ByteOrder::Native).is_err());
    }
}
