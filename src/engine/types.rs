//! Core Warehouse Types and Identifiers
//!
//! This module defines the small, copyable identifiers shared by every other
//! part of the warehouse: attribute kinds, object slots, query ids and the
//! identity of a warehouse instance itself.
//!
//! ## Identifier model
//!
//! - [`KindId`]: dense index of a registered attribute kind. Assigned in
//!   registration order, stable for the lifetime of one warehouse.
//! - [`ObjectId`]: dense slot of an inserted object in the object list.
//! - [`QueryId`]: monotonically increasing id assigned to a distinct
//!   condition list. Ids are never reused, even across cache invalidation.
//! - [`WarehouseId`]: process-unique identity of a warehouse instance. Every
//!   bound attribute carries the id of the warehouse it was built against.
//!
//! ## Bit sets
//!
//! [`KindSet`] is a fixed-width bitset over kind ids, used to describe which
//! kinds a condition list touches.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHasher;


/// Dense identifier of a registered attribute kind.
pub type KindId = u16;

/// Dense identifier of an inserted object (its slot in the object list).
pub type ObjectId = u32;

/// Identifier assigned to a distinct condition list.
pub type QueryId = u64;

/// Maximum number of attribute kinds one warehouse can register.
pub const KIND_CAP: usize = 64;

/// Process-unique identity of a warehouse instance.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WarehouseId(pub u64);

static NEXT_WAREHOUSE_ID: AtomicU64 = AtomicU64::new(1);

impl WarehouseId {
    /// Allocates a fresh id. Never returns the same value twice in one process.
    pub(crate) fn next() -> Self {
        WarehouseId(NEXT_WAREHOUSE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "warehouse#{}", self.0)
    }
}

/// Bitset over attribute kind ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KindSet {
    bits: u64,
}

const _: [(); 1] = [(); (KIND_CAP <= 64) as usize];

impl KindSet {
    /// Sets the bit for `kind`.
    #[inline]
    pub fn set(&mut self, kind: KindId) {
        debug_assert!((kind as usize) < KIND_CAP);
        self.bits |= 1u64 << kind;
    }

    /// Returns `true` if `kind` is present.
    #[inline]
    pub fn has(&self, kind: KindId) -> bool {
        (kind as usize) < KIND_CAP && (self.bits >> kind) & 1 == 1
    }

    /// Returns `true` if no kind is present.
    #[inline]
    pub fn is_empty(&self) -> bool { self.bits == 0 }

    /// Number of kinds present.
    #[inline]
    pub fn len(&self) -> usize { self.bits.count_ones() as usize }

    /// Iterates over all kind ids set in this bitset, ascending.
    pub fn iter(&self) -> impl Iterator<Item = KindId> {
        let mut bits = self.bits;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let tz = bits.trailing_zeros();
            bits &= bits - 1;
            Some(tz as KindId)
        })
    }
}

impl FromIterator<KindId> for KindSet {
    fn from_iter<I: IntoIterator<Item = KindId>>(iter: I) -> Self {
        let mut set = KindSet::default();
        for kind in iter { set.set(kind); }
        set
    }
}

/// Deterministic 64-bit digest of any hashable value.
///
/// Uses `FxHasher` with its fixed seed, so the result is stable across runs
/// and threads. Attribute implementations use this for `hash_value`.
#[inline]
pub fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Mixes `value` into `seed`.
#[inline]
pub fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ (value
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_set_iterates_in_ascending_order() {
        let set: KindSet = [5, 0, 63, 17].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 5, 17, 63]);
        assert_eq!(set.len(), 4);
        assert!(set.has(63));
        assert!(!set.has(1));
        assert!(!set.has(200));
    }

    #[test]
    fn warehouse_ids_are_unique() {
        let a = WarehouseId::next();
        let b = WarehouseId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_of_is_deterministic() {
        assert_eq!(hash_of("block"), hash_of("block"));
        assert_eq!(hash_of(&[1u32, 2, 3][..]), hash_of(&vec![1u32, 2, 3][..]));
    }

    #[test]
    fn hash_combine_is_order_sensitive() {
        let ab = hash_combine(hash_combine(0, 1), 2);
        let ba = hash_combine(hash_combine(0, 2), 1);
        assert_ne!(ab, ba);
    }
}
