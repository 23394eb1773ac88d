//! Hash containers with a stable hashing state, re-exports *hashbrown* and *foldhash*.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, FixedHasher};

/// A [`hashbrown::HashMap`] using [`FixedHashState`] by default.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`] by default.
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;

/// Creates an empty [`HashMap`] with the fixed hashing state.
///
/// # Examples
///
/// ```
/// use csp_utils::hash::{HashMap, new_map};
///
/// let mut map: HashMap<&str, u32> = new_map();
/// map.insert("demo", 1);
/// assert_eq!(map.get("demo"), Some(&1));
/// ```
#[inline]
pub fn new_map<K, V>() -> HashMap<K, V> {
    hashbrown::HashMap::with_hasher(FixedHashState)
}

/// Creates an empty [`HashSet`] with the fixed hashing state.
#[inline]
pub fn new_set<T>() -> HashSet<T> {
    hashbrown::HashSet::with_hasher(FixedHashState)
}

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;

// -----------------------------------------------------------------------------
// Tests
