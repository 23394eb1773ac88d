use alloc::borrow::Cow;
use alloc::vec::Vec;

use super::{TypeKey, TypeTraits};
use crate::version::InterfaceVersion;

/// A declared field of a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    name: Cow<'static, str>,
    traits: TypeTraits,
}

impl FieldInfo {
    pub fn new(name: impl Into<Cow<'static, str>>, traits: TypeTraits) -> Self {
        Self {
            name: name.into(),
            traits,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn traits(&self) -> &TypeTraits {
        &self.traits
    }
}

/// Layout of a struct as declared by its protocol interface.
///
/// The field order is the wire order. The parent is referenced by key, so a
/// type may hold references to itself.
///
/// # Examples
///
/// ```
/// use csp_base::type_traits::{PrimitiveKind, StructInfo, TypeTraits};
/// use csp_base::version::InterfaceVersion;
///
/// let info = StructInfo::new("shapes::Circle")
///     .with_parent("shapes::Shape")
///     .with_version(InterfaceVersion(2))
///     .with_field("radius", TypeTraits::primitive(PrimitiveKind::F64));
///
/// assert_eq!(info.field_len(), 1);
/// assert_eq!(info.index_of("radius"), Some(0));
/// assert_eq!(info.parent().map(|p| p.as_str()), Some("shapes::Shape"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructInfo {
    key: TypeKey,
    version: InterfaceVersion,
    parent: Option<TypeKey>,
    fields: Vec<FieldInfo>,
}

impl StructInfo {
    /// A struct without parent and fields, at interface version `0`.
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

    pub fn with_parent(mut self, parent: impl Into<TypeKey>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Appends a field after the ones declared so far.
    pub fn with_field(mut self, name: impl Into<Cow<'static, str>>, traits: TypeTraits) -> Self {
        self.fields.push(FieldInfo::new(name, traits));
        self
    }

    #[inline]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// The interface version this layout belongs to.
    #[inline]
    pub fn version(&self) -> InterfaceVersion {
        self.version
    }

    #[inline]
    pub fn parent(&self) -> Option<&TypeKey> {
        self.parent.as_ref()
    }

    /// Own fields in declaration order, parents excluded.
    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| field.name() == name)
    }

    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&FieldInfo> {
        self.fields.get(index)
    }

    /// This is O(N) complexity.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name() == name)
    }

    #[inline]
    pub fn field_len(&self) -> usize {
        self.fields.len()
    }
}
