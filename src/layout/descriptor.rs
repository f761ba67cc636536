//! # Type Descriptors
//!
//! A [`TypeDescriptor`] is an immutable, recursive description of a composite
//! value: primitives, structs, unions, and fixed-count arrays. Descriptors
//! carry the layout knobs a C compiler would honour (per-field alignment and
//! padding overrides, byte-order tags, auto-padding control) and are the sole
//! input of the layout engine.
//!
//! Descriptors are plain data. Building one allocates nothing beyond the
//! field vectors, and the same descriptor can be shared and re-laid-out any
//! number of times with identical results.

/// Primitive value kinds and their fixed widths.
///
/// Default alignment equals width, matching the host ABI for all of these.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    Char16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl PrimitiveType {
    pub fn width(self) -> usize {
        match self {
            PrimitiveType::Bool | PrimitiveType::I8 | PrimitiveType::U8 => 1,
            PrimitiveType::I16 | PrimitiveType::U16 | PrimitiveType::Char16 => 2,
            PrimitiveType::I32 | PrimitiveType::U32 | PrimitiveType::F32 => 4,
            PrimitiveType::I64 | PrimitiveType::U64 | PrimitiveType::F64 => 8,
        }
    }

    pub fn alignment(self) -> usize {
        self.width()
    }

    /// Codec-equivalent kind: `char16` shares its bit pattern with `u16`, so
    /// typed access treats them interchangeably.
    pub(crate) fn codec_kind(self) -> PrimitiveType {
        match self {
            PrimitiveType::Char16 => PrimitiveType::U16,
            other => other,
        }
    }
}

/// Per-field byte order. `Native` is the host order and the default; the
/// other two force a swap in the primitive codec without changing width or
/// offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Native,
    LittleEndian,
    BigEndian,
}

/// Recursive description of a value shape.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveType),
    Struct {
        fields: Vec<FieldDescriptor>,
        opts: LayoutOpts,
    },
    Union {
        fields: Vec<FieldDescriptor>,
    },
    Array {
        element: Box<TypeDescriptor>,
        count: usize,
    },
}

impl TypeDescriptor {
    pub const BOOL: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::Bool);
    pub const I8: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::I8);
    pub const U8: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::U8);
    pub const I16: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::I16);
    pub const U16: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::U16);
    pub const CHAR16: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::Char16);
    pub const I32: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::I32);
    pub const U32: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::U32);
    pub const I64: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::I64);
    pub const U64: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::U64);
    pub const F32: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::F32);
    pub const F64: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::F64);

    /// A struct with default layout options (auto padding on, end padding
    /// computed at top level).
    pub fn struct_of(fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        TypeDescriptor::Struct {
            fields: fields.into_iter().collect(),
            opts: LayoutOpts::default(),
        }
    }

    /// A struct with explicit layout options.
    pub fn struct_with(
        fields: impl IntoIterator<Item = FieldDescriptor>,
        opts: LayoutOpts,
    ) -> Self {
        TypeDescriptor::Struct {
            fields: fields.into_iter().collect(),
            opts,
        }
    }

    /// A union: every field overlaps at offset zero, no padding is inserted.
    pub fn union_of(fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        TypeDescriptor::Union {
            fields: fields.into_iter().collect(),
        }
    }

    /// A fixed-count array. `count == 0` describes an unsized tail.
    pub fn array_of(element: TypeDescriptor, count: usize) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
            count,
        }
    }
}

/// Layout options on a struct descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOpts {
    /// Insert padding so every field lands on its natural (or overridden)
    /// alignment, the way a C compiler would. Ignored for unions.
    pub auto_padding: bool,
    /// End padding in bytes. `None` means "auto": at the outermost level with
    /// auto padding on, pad the struct to a multiple of its alignment so it
    /// tiles as an array element; otherwise add nothing. An explicit value
    /// (including 0) is applied verbatim.
    pub end_padding: Option<usize>,
}

impl Default for LayoutOpts {
    fn default() -> Self {
        Self {
            auto_padding: true,
            end_padding: None,
        }
    }
}

impl LayoutOpts {
    pub fn packed() -> Self {
        Self {
            auto_padding: false,
            end_padding: None,
        }
    }

    pub fn with_end_padding(mut self, bytes: usize) -> Self {
        self.end_padding = Some(bytes);
        self
    }

    pub fn without_auto_padding(mut self) -> Self {
        self.auto_padding = false;
        self
    }
}

/// One named, typed member of a struct or union.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    pub opts: FieldOpts,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            opts: FieldOpts::default(),
        }
    }

    /// Override the field's alignment. Must be a power of two; validated by
    /// the layout engine.
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.opts.alignment = Some(alignment);
        self
    }

    /// Explicit padding in bytes immediately before this field. Suppresses
    /// the auto-computed padding for this field.
    pub fn with_padding_before(mut self, bytes: usize) -> Self {
        self.opts.padding_before = Some(bytes);
        self
    }

    /// Byte-order override. Only valid on primitive fields; validated by the
    /// layout engine.
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.opts.byte_order = order;
        self
    }

    /// Rename the field in the computed layout (path lookups use this name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.opts.rename = Some(name.into());
        self
    }

    /// The name the computed layout will carry.
    pub(crate) fn layout_name(&self) -> &str {
        self.opts.rename.as_deref().unwrap_or(&self.name)
    }
}

/// Per-field layout overrides.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldOpts {
    pub rename: Option<String>,
    pub alignment: Option<usize>,
    pub padding_before: Option<usize>,
    pub byte_order: ByteOrder,
}
