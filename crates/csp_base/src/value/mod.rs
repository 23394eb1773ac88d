//! Dynamic values walked by the general processor.
//!
//! Plain data is stored inline in a [`Value`]. Objects that are shared or
//! cyclic live in an [`ObjectGraph`] and are referred to through
//! [`Value::Ref`]; the arena index is the identity used for pointer tracking.

// -----------------------------------------------------------------------------
// Modules

mod graph;

// -----------------------------------------------------------------------------
// Exports

pub use graph::{ObjectGraph, ObjectId};

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::type_traits::TypeKey;
use crate::version::InterfaceVersion;

// -----------------------------------------------------------------------------
// Value

/// A serializable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An absent reference.
    Null,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    /// Elements of an array or a collection.
    Array(Vec<Value>),
    /// Entries of a map, in wire order.
    Map(Vec<(Value, Value)>),
    Struct(StructValue),
    /// A reference to an object of the graph.
    Ref(ObjectId),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::U8(_) => "u8",
            Value::I16(_) => "i16",
            Value::U16(_) => "u16",
            Value::I32(_) => "i32",
            Value::U32(_) => "u32",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
            Value::Ref(_) => "reference",
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_ref_id(&self) -> Option<ObjectId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }
    )*};
}

impl_from! {
    bool => Bool,
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
    String => String,
    StructValue => Struct,
    ObjectId => Ref,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(String::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// -----------------------------------------------------------------------------
// StructValue

/// Field values of a struct instance.
///
/// Fields follow the declaration order of the struct layout; the parent part
/// is kept separately, like the layout's parent.
///
/// # Examples
///
/// ```
/// use csp_base::value::{StructValue, Value};
///
/// let circle = StructValue::new("shapes::Circle")
///     .with_parent(StructValue::new("shapes::Shape").with_field("red"))
///     .with_field(2.5_f64);
///
/// assert_eq!(circle.field(0), Some(&Value::F64(2.5)));
/// assert_eq!(circle.parent().unwrap().key().as_str(), "shapes::Shape");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    key: TypeKey,
    version: InterfaceVersion,
    parent: Option<Box<StructValue>>,
    fields: Vec<Value>,
}

impl StructValue {
    /// An instance of `key` at interface version `0`.
    pub fn new(key: impl Into<TypeKey>) -> Self {
        Self {
            key: key.into(),
            version: InterfaceVersion::default(),
            parent: None,
            fields: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: InterfaceVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_parent(mut self, parent: StructValue) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    pub fn with_field(mut self, value: impl Into<Value>) -> Self {
        self.fields.push(value.into());
        self
    }

    #[inline]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// The interface version the instance was created for.
    #[inline]
    pub fn version(&self) -> InterfaceVersion {
        self.version
    }

    #[inline]
    pub fn set_version(&mut self, version: InterfaceVersion) {
        self.version = version;
    }

    #[inline]
    pub fn parent(&self) -> Option<&StructValue> {
        self.parent.as_deref()
    }

    #[inline]
    pub fn parent_mut(&mut self) -> Option<&mut StructValue> {
        self.parent.as_deref_mut()
    }

    #[inline]
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    #[inline]
    pub fn fields_mut(&mut self) -> &mut Vec<Value> {
        &mut self.fields
    }

    #[inline]
    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }
}
