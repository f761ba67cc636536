//! # Record Definition Macro
//!
//! [`record!`](crate::record) declares a plain struct and derives its
//! [`Record`](crate::access::Record) impl in one go: the descriptor is built
//! from the field types, and `read`/`write` visit the fields in declaration
//! order, which is exactly what the compiled leaf program expects.
//!
//! ## Usage
//!
//! ```ignore
//! use memlay::record;
//!
//! record! {
//!     pub struct Point {
//!         x: i32,
//!         y: i32,
//!     }
//! }
//!
//! record! {
//!     /// Nested records compose: City embeds Point by value.
//!     #[derive(Hash)]
//!     pub struct City {
//!         location: Point,
//!         population: i64,
//!     }
//! }
//! ```
//!
//! The macro derives `Debug`, `Clone`, `Copy`, and `PartialEq`; extra
//! derives (for example `Hash` + `Eq` on map key types without float
//! fields) can be attached on top.
//!
//! Fields needing layout overrides (alignment, explicit padding, byte
//! order, renames) fall outside the macro: implement `Record` by hand with
//! the `FieldDescriptor` builder methods and the same `read`/`write` body
//! shape.

/// Declare a struct and implement `Record` for it.
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $fty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field : $fty, )*
        }

        impl $crate::access::Record for $name {
            fn descriptor() -> $crate::layout::TypeDescriptor {
                $crate::layout::TypeDescriptor::struct_of([
                    $(
                        $crate::layout::FieldDescriptor::new(
                            stringify!($field),
                            <$fty as $crate::access::Record>::descriptor(),
                        ),
                    )*
                ])
            }

            fn read(reader: &mut $crate::access::RecordReader<'_>) -> ::eyre::Result<Self> {
                Ok(Self {
                    $( $field: <$fty as $crate::access::Record>::read(reader)?, )*
                })
            }

            fn write(&self, writer: &mut $crate::access::RecordWriter<'_>) -> ::eyre::Result<()> {
                $( <$fty as $crate::access::Record>::write(&self.$field, writer)?; )*
                Ok(())
            }
        }
    };
}
