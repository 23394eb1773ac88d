//! Static shape descriptions of serializable values.
//!
//! A [`TypeTraits`] tree tells the general processor how a value is laid out
//! on the wire: which primitive width, whether a sequence carries its length,
//! which charset a string uses, which processor handles an object, and whether
//! a node is written behind a pointer mark.
//!
//! Trees are either assembled from the constructors on [`TypeTraits`] or
//! incrementally through a [`TypeTraitsBuilder`]. Struct layouts are described
//! by [`StructInfo`].

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod charset;
mod struct_info;

// -----------------------------------------------------------------------------
// Exports

pub use builder::{BuilderState, NodeKind, TypeTraitsBuilder, TypeTraitsError};
pub use charset::Charset;
pub use struct_info::{FieldInfo, StructInfo};

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;

// -----------------------------------------------------------------------------
// TypeKey

/// Identity of a declaring type, usually its type path.
///
/// # Examples
///
/// ```
/// use csp_base::type_traits::TypeKey;
///
/// const POINT: TypeKey = TypeKey::new("geometry::Point");
///
/// assert_eq!(POINT.as_str(), "geometry::Point");
/// assert_eq!(POINT, TypeKey::from(String::from("geometry::Point")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TypeKey(Cow<'static, str>);

impl TypeKey {
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Key of the Rust type `T`.
    #[inline]
    pub fn of<T: ?Sized>() -> Self {
        Self::new(core::any::type_name::<T>())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TypeKey {
    #[inline]
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeKey {
    #[inline]
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl Borrow<str> for TypeKey {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// -----------------------------------------------------------------------------
// PrimitiveKind

/// Fixed-width scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl PrimitiveKind {
    /// Width on the wire, in octets, without a size tag.
    pub const fn size(self) -> usize {
        match self {
            PrimitiveKind::Bool | PrimitiveKind::I8 | PrimitiveKind::U8 => 1,
            PrimitiveKind::I16 | PrimitiveKind::U16 => 2,
            PrimitiveKind::I32 | PrimitiveKind::U32 | PrimitiveKind::F32 => 4,
            PrimitiveKind::I64 | PrimitiveKind::U64 | PrimitiveKind::F64 => 8,
        }
    }

    /// Integers are the only scalars that carry a size tag.
    pub const fn is_integer(self) -> bool {
        !matches!(
            self,
            PrimitiveKind::Bool | PrimitiveKind::F32 | PrimitiveKind::F64
        )
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// TypeTraits

/// Shape of an array or a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceTraits {
    element: Box<TypeTraits>,
    fixed_size: Option<usize>,
}

impl SequenceTraits {
    #[inline]
    pub fn element(&self) -> &TypeTraits {
        &self.element
    }

    /// Length dictated by the interface definition, absent from the wire.
    #[inline]
    pub fn fixed_size(&self) -> Option<usize> {
        self.fixed_size
    }
}

/// Shape of a map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapTraits {
    key: Box<TypeTraits>,
    value: Box<TypeTraits>,
}

impl MapTraits {
    #[inline]
    pub fn key(&self) -> &TypeTraits {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &TypeTraits {
        &self.value
    }
}

/// The variant part of a [`TypeTraits`] node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraitsKind {
    Primitive(PrimitiveKind),
    Array(SequenceTraits),
    Collection(SequenceTraits),
    Map(MapTraits),
    String(Charset),
    /// Dispatched to the processor of the declaring type.
    Object(TypeKey),
}

/// A node of the type traits tree.
///
/// # Examples
///
/// ```
/// use csp_base::type_traits::{Charset, PrimitiveKind, TraitsKind, TypeTraits};
///
/// // Map<String, i32[2]> behind a pointer.
/// let traits = TypeTraits::map(
///     TypeTraits::string(Charset::Utf8),
///     TypeTraits::fixed_array(TypeTraits::primitive(PrimitiveKind::I32), 2),
/// )
/// .as_reference();
///
/// assert!(traits.is_reference());
/// let TraitsKind::Map(map) = traits.kind() else { unreachable!() };
/// assert_eq!(map.key().kind(), &TraitsKind::String(Charset::Utf8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTraits {
    kind: TraitsKind,
    reference: bool,
}

impl TypeTraits {
    #[inline]
    pub const fn new(kind: TraitsKind) -> Self {
        Self {
            kind,
            reference: false,
        }
    }

    #[inline]
    pub const fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(TraitsKind::Primitive(kind))
    }

    #[inline]
    pub const fn string(charset: Charset) -> Self {
        Self::new(TraitsKind::String(charset))
    }

    #[inline]
    pub fn object(key: impl Into<TypeKey>) -> Self {
        Self::new(TraitsKind::Object(key.into()))
    }

    pub fn array(element: TypeTraits) -> Self {
        Self::new(TraitsKind::Array(SequenceTraits {
            element: Box::new(element),
            fixed_size: None,
        }))
    }

    pub fn fixed_array(element: TypeTraits, len: usize) -> Self {
        Self::new(TraitsKind::Array(SequenceTraits {
            element: Box::new(element),
            fixed_size: Some(len),
        }))
    }

    pub fn collection(element: TypeTraits) -> Self {
        Self::new(TraitsKind::Collection(SequenceTraits {
            element: Box::new(element),
            fixed_size: None,
        }))
    }

    pub fn map(key: TypeTraits, value: TypeTraits) -> Self {
        Self::new(TraitsKind::Map(MapTraits {
            key: Box::new(key),
            value: Box::new(value),
        }))
    }

    /// Marks the node as written behind a pointer mark.
    ///
    /// Primitives cannot be references, the processor rejects such nodes.
    #[inline]
    pub fn as_reference(mut self) -> Self {
        self.reference = true;
        self
    }

    #[inline]
    pub fn kind(&self) -> &TraitsKind {
        &self.kind
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        self.reference
    }
}
