use alloc::vec::Vec;
use core::fmt;

use super::Value;

/// Index of an object inside an [`ObjectGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena of shared objects.
///
/// Objects reference each other through [`Value::Ref`], which makes cycles
/// representable without shared ownership.
///
/// # Examples
///
/// ```
/// use csp_base::value::{ObjectGraph, StructValue, Value};
///
/// let mut graph = ObjectGraph::new();
/// let node = graph.reserve();
/// graph.replace(node, StructValue::new("list::Node").with_field(node).into());
///
/// let Some(Value::Struct(value)) = graph.get(node) else { unreachable!() };
/// assert_eq!(value.field(0), Some(&Value::Ref(node)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectGraph {
    objects: Vec<Value>,
}

impl ObjectGraph {
    pub const fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Adds an object and returns its identity.
    pub fn insert(&mut self, value: Value) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(value);
        id
    }

    /// Adds a [`Value::Null`] placeholder to be filled through [`replace`](Self::replace).
    #[inline]
    pub fn reserve(&mut self) -> ObjectId {
        self.insert(Value::Null)
    }

    /// Replaces the object `id`, returning the previous one.
    pub fn replace(&mut self, id: ObjectId, value: Value) -> Option<Value> {
        self.objects
            .get_mut(id.0)
            .map(|slot| core::mem::replace(slot, value))
    }

    #[inline]
    pub fn get(&self, id: ObjectId) -> Option<&Value> {
        self.objects.get(id.0)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Value> {
        self.objects.get_mut(id.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (ObjectId, &Value)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, value)| (ObjectId(index), value))
    }
}
