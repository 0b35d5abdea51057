//! Hash state used by record field maps.
//!
//! Based on `foldhash` with a fixed seed, so hashes of values only depend on
//! their content. Record and map hashes are combined per entry and do not
//! depend on iteration order.

use core::hash::{BuildHasher, Hash};

use foldhash::fast::{FixedState, FoldHasher};

/// A fixed hash seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x5D1A_7E0C_93B2_F461);

/// A hasher whose results only depend on the input.
pub type FixedHasher = FoldHasher<'static>;

/// Fixed hash state based upon a random but fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use slate_record::hash::FixedHashState;
///
/// assert_eq!(FixedHashState.hash_one("Foo"), FixedHashState.hash_one("Foo"));
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

/// A `hashbrown` map using [`FixedHashState`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// Combine the hashes of `entries` without depending on their order.
pub(crate) fn unordered_hash<'a, K, V, I>(entries: I) -> u64
where
    K: Hash + ?Sized + 'a,
    V: Hash + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    entries.into_iter().fold(0u64, |acc, entry| {
        acc.wrapping_add(FixedHashState.hash_one(entry))
    })
}

// -----------------------------------------------------------------------------
// Tests
