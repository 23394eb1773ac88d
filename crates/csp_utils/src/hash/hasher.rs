//! Provide `FixedHasher`.
//!
//! `FixedHasher` is based on the `foldhash` crate and produces stable
//! results through a fixed seed, so lookups never depend on process state.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

/// The fixed seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6353_505F_7273_2D31);

/// A hasher whose results only depend on its input.
///
/// A type alias for [`foldhash::fast::FoldHasher`], created through
/// [`FixedHashState::build_hasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Hash state built upon a fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::{BuildHasher, Hash, Hasher};
/// use csp_utils::hash::FixedHashState;
///
/// let hash_of = |v: &str| {
///     let mut hasher = FixedHashState.build_hasher();
///     v.hash(&mut hasher);
///     hasher.finish()
/// };
///
/// assert_eq!(hash_of("csp"), hash_of("csp"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}
