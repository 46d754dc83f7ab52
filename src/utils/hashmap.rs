//! Hash-maps and hash-sets with a fixed hasher.
//!
//! Every container of this module hashes with [`FxHasher32`](super::fx_hasher::FxHasher32),
//! so two runs over the same input visit their entries in the same order.

use super::fx_hasher::FxBuildHasher32;

pub use hashbrown::hash_map::Entry;

/// Hashmap using [`hashbrown::HashMap`] with a deterministic hasher.
pub type HashMap<K, V> = hashbrown::hash_map::HashMap<K, V, FxBuildHasher32>;

/// Hashset using [`hashbrown::HashSet`] with a deterministic hasher.
pub type HashSet<K> = hashbrown::hash_set::HashSet<K, FxBuildHasher32>;
