use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use csp_utils::hash::{HashMap, HashSet, new_map, new_set};

use crate::context::{DeserializationContext, SerializationContext};
use crate::status::{CspError, CspResult};
use crate::type_traits::{StructInfo, TypeKey};
use crate::value::{ObjectGraph, Value};

// -----------------------------------------------------------------------------
// Processor

/// Serialize function of a specialized processor.
pub type SerializeFn = fn(&Value, &ObjectGraph, &mut SerializationContext<'_>) -> CspResult<()>;

/// Deserialize function of a specialized processor.
pub type DeserializeFn = fn(&mut ObjectGraph, &mut DeserializationContext<'_>) -> CspResult<Value>;

/// A type-specific serialize/deserialize pair.
///
/// Replaces the generic struct traversal for its declaring type.
#[derive(Clone, Copy)]
pub struct Processor {
    serialize: SerializeFn,
    deserialize: DeserializeFn,
}

impl Processor {
    #[inline]
    pub const fn new(serialize: SerializeFn, deserialize: DeserializeFn) -> Self {
        Self {
            serialize,
            deserialize,
        }
    }

    #[inline]
    pub fn serialize(
        &self,
        value: &Value,
        graph: &ObjectGraph,
        ctx: &mut SerializationContext<'_>,
    ) -> CspResult<()> {
        (self.serialize)(value, graph, ctx)
    }

    #[inline]
    pub fn deserialize(
        &self,
        graph: &mut ObjectGraph,
        ctx: &mut DeserializationContext<'_>,
    ) -> CspResult<Value> {
        (self.deserialize)(graph, ctx)
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor").finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// auto_register

/// A processor submitted through [`submit_processor!`](crate::submit_processor).
#[cfg(feature = "auto_register")]
#[derive(Debug)]
pub struct AutoProcessor {
    key: &'static str,
    processor: Processor,
}

#[cfg(feature = "auto_register")]
impl AutoProcessor {
    #[doc(hidden)]
    pub const fn new(key: &'static str, processor: Processor) -> Self {
        Self { key, processor }
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(AutoProcessor);

/// Submits a specialized processor for [`ProcessorRegistry::auto_register`].
///
/// Requires the `auto_register` feature.
///
/// ```ignore
/// csp_base::submit_processor!("geo::Point", serialize_point, deserialize_point);
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! submit_processor {
    ($key:expr, $serialize:path, $deserialize:path $(,)?) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::processing::AutoProcessor::new(
                $key,
                $crate::processing::Processor::new($serialize, $deserialize),
            )
        }
    };
}

// -----------------------------------------------------------------------------
// ProcessorRegistry

struct Tables {
    processors: HashMap<TypeKey, Processor>,
    layouts: HashMap<TypeKey, Arc<StructInfo>>,
}

/// Central store of specialized processors and declared struct layouts.
///
/// Lookups take a shared lock and copy the entry out, so processors run
/// without holding it. Registration takes the exclusive lock.
///
/// # Examples
///
/// ```
/// use csp_base::processing::{Processor, ProcessorRegistry};
/// use csp_base::value::Value;
///
/// let registry = ProcessorRegistry::new();
/// registry.register("demo::Empty", Processor::new(
///     |_, _, _| Ok(()),
///     |_, _| Ok(Value::Null),
/// ));
///
/// assert!(registry.find("demo::Empty").is_some());
/// assert!(registry.unregister("demo::Empty").is_some());
/// assert!(registry.find("demo::Empty").is_none());
/// ```
pub struct ProcessorRegistry {
    tables: RwLock<Tables>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                processors: new_map(),
                layouts: new_map(),
            }),
        }
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs the processor of `key`, returning the one it replaces.
    pub fn register(&self, key: impl Into<TypeKey>, processor: Processor) -> Option<Processor> {
        let key = key.into();
        let previous = self.write().processors.insert(key.clone(), processor);
        if previous.is_some() {
            log::warn!("specialized processor of `{key}` was replaced");
        } else {
            log::debug!("registered specialized processor of `{key}`");
        }
        previous
    }

    /// Removes the processor of `key`.
    pub fn unregister(&self, key: &str) -> Option<Processor> {
        let removed = self.write().processors.remove(key);
        if removed.is_some() {
            log::debug!("unregistered specialized processor of `{key}`");
        }
        removed
    }

    /// Returns the processor of `key`, if any.
    #[inline]
    pub fn find(&self, key: &str) -> Option<Processor> {
        self.read().processors.get(key).copied()
    }

    /// Like [`find`](Self::find), failing with [`CspError::NoSuchHandler`].
    pub fn provide(&self, key: &TypeKey) -> CspResult<Processor> {
        self.find(key.as_str())
            .ok_or_else(|| CspError::NoSuchHandler(key.clone()))
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.read().processors.contains_key(key)
    }

    /// Number of registered processors.
    #[inline]
    pub fn len(&self) -> usize {
        self.read().processors.len()
    }

    /// Declares the layout of a struct for the generic traversal.
    ///
    /// Fails with [`CspError::InvalidArgument`] on duplicate field names.
    /// Returns the layout it replaces.
    pub fn declare(&self, info: StructInfo) -> CspResult<Option<Arc<StructInfo>>> {
        {
            let mut names: HashSet<&str> = new_set();
            for field in info.fields() {
                if !names.insert(field.name()) {
                    return Err(CspError::invalid(format!(
                        "field `{}` of `{}` is declared twice",
                        field.name(),
                        info.key()
                    )));
                }
            }
        }

        log::debug!("declaring layout of `{}`", info.key());
        let key = info.key().clone();
        Ok(self.write().layouts.insert(key, Arc::new(info)))
    }

    /// Returns the declared layout of `key`, if any.
    #[inline]
    pub fn layout(&self, key: &str) -> Option<Arc<StructInfo>> {
        self.read().layouts.get(key).cloned()
    }

    /// Registers every processor submitted with [`submit_processor!`](crate::submit_processor).
    ///
    /// Returns the number of processors registered. Always `0` without the
    /// `auto_register` feature or on platforms `inventory` does not support.
    pub fn auto_register(&self) -> usize {
        #[cfg(feature = "auto_register")]
        {
            let mut count = 0;
            for entry in inventory::iter::<AutoProcessor> {
                self.register(TypeKey::new(entry.key), entry.processor);
                count += 1;
            }
            count
        }
        #[cfg(not(feature = "auto_register"))]
        {
            0
        }
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.read();
        f.debug_struct("ProcessorRegistry")
            .field("processors", &tables.processors.keys().collect::<Vec<_>>())
            .field("layouts", &tables.layouts.keys().collect::<Vec<_>>())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
