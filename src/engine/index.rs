//! Attribute index.
//!
//! Narrows the set of objects a condition list has to be checked against.
//! Each kind uses one of two tiers, fixed at registration time:
//!
//! | Tier | Stored as | Probe returns |
//! |------|-----------|---------------|
//! | `Exact` | `hash_value -> [ObjectId]` bucket per kind | the bucket under the probe's own hash |
//! | `Scan`  | nothing | every object |
//!
//! The index is an optimization only. Buckets may contain hash collisions,
//! so callers must re-validate every candidate with `is_match` against the
//! live stored attribute.
//!
//! Maintenance is incremental: `insert` on add, `replace` on update.

use rustc_hash::FxHashMap;

use crate::engine::attribute::{BoundAttribute, IndexTier};
use crate::engine::types::{KindId, ObjectId};


/// Candidate set produced for one condition list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Candidates {
    /// Every object in the store is a candidate.
    All,

    /// Only these objects (ascending, deduplicated) can match.
    Some(Vec<ObjectId>),
}

impl Candidates {
    /// Number of candidates, given the total object count.
    pub fn len(&self, total: usize) -> usize {
        match self {
            Candidates::All => total,
            Candidates::Some(ids) => ids.len(),
        }
    }
}

/// Per-kind hash buckets for exact-tier kinds.
pub struct AttributeIndex {
    tiers: Vec<IndexTier>,
    buckets: Vec<FxHashMap<u64, Vec<ObjectId>>>,
}

impl AttributeIndex {
    /// Creates an empty index for kinds with the given tiers (indexed by kind id).
    pub fn new(tiers: Vec<IndexTier>) -> Self {
        let buckets = tiers.iter().map(|_| FxHashMap::default()).collect();
        Self { tiers, buckets }
    }

    /// Tier of `kind`.
    #[inline]
    pub fn tier(&self, kind: KindId) -> IndexTier {
        self.tiers.get(kind as usize).copied().unwrap_or_default()
    }

    /// Indexes a freshly added object. `id` must exceed every id already indexed.
    pub fn insert(&mut self, id: ObjectId, attributes: &[BoundAttribute]) {
        for attribute in attributes {
            if self.tier(attribute.kind()) != IndexTier::Exact { continue; }
            let bucket = self.buckets[attribute.kind() as usize]
                .entry(attribute.value().hash_value())
                .or_default();
            debug_assert!(bucket.last().map_or(true, |&last| last < id));
            bucket.push(id);
        }
    }

    /// Moves object `id` from the buckets of `old` to those of `new`.
    pub fn replace(&mut self, id: ObjectId, old: &[BoundAttribute], new: &[BoundAttribute]) {
        for (before, after) in old.iter().zip(new) {
            let kind = after.kind();
            if self.tier(kind) != IndexTier::Exact { continue; }

            let old_hash = before.value().hash_value();
            let new_hash = after.value().hash_value();
            if old_hash == new_hash { continue; }

            let buckets = &mut self.buckets[kind as usize];
            if let Some(bucket) = buckets.get_mut(&old_hash) {
                if let Ok(pos) = bucket.binary_search(&id) {
                    bucket.remove(pos);
                }
                if bucket.is_empty() {
                    buckets.remove(&old_hash);
                }
            }
            let bucket = buckets.entry(new_hash).or_default();
            if let Err(pos) = bucket.binary_search(&id) {
                bucket.insert(pos, id);
            }
        }
    }

    /// Objects that may satisfy `condition`, or `None` if the kind scans.
    pub fn probe(&self, condition: &BoundAttribute) -> Option<&[ObjectId]> {
        if self.tier(condition.kind()) != IndexTier::Exact {
            return None;
        }
        let bucket = self.buckets[condition.kind() as usize]
            .get(&condition.value().hash_value())
            .map_or(&[][..], Vec::as_slice);
        Some(bucket)
    }

    /// Intersection of the per-condition candidate sets.
    ///
    /// Exact-tier conditions are intersected smallest bucket first; scan-tier
    /// conditions do not narrow the set. With no exact-tier condition the
    /// result is [`Candidates::All`].
    pub fn candidates(&self, conditions: &[BoundAttribute]) -> Candidates {
        let mut buckets: Vec<&[ObjectId]> = conditions
            .iter()
            .filter_map(|c| self.probe(c))
            .collect();
        if buckets.is_empty() {
            return Candidates::All;
        }
        buckets.sort_by_key(|b| b.len());

        let mut acc: Vec<ObjectId> = buckets[0].to_vec();
        for bucket in &buckets[1..] {
            if acc.is_empty() { break; }
            acc.retain(|id| bucket.binary_search(id).is_ok());
        }
        Candidates::Some(acc)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttribName, AttribSubdomains, AttribSystem};
    use crate::engine::attribute::Attribute;
    use crate::engine::types::WarehouseId;

    const W: WarehouseId = WarehouseId(99);

    fn system(name: &str) -> BoundAttribute {
        BoundAttribute::new(0, W, Box::new(AttribSystem::new(name)))
    }

    fn named(name: &str) -> BoundAttribute {
        BoundAttribute::new(1, W, Box::new(AttribName::new(name)))
    }

    fn blocks(ids: &[u16]) -> BoundAttribute {
        BoundAttribute::new(2, W, Box::new(AttribSubdomains::stored(ids.iter().copied())))
    }

    fn index() -> AttributeIndex {
        AttributeIndex::new(vec![
            AttribSystem::default().index_tier(),
            AttribName::default().index_tier(),
            AttribSubdomains::default().index_tier(),
        ])
    }

    #[test]
    fn exact_probe_returns_matching_bucket() {
        let mut idx = index();
        idx.insert(0, &[system("nl"), named("a"), blocks(&[1])]);
        idx.insert(1, &[system("aux"), named("b"), blocks(&[2])]);
        idx.insert(2, &[system("nl"), named("c"), blocks(&[1, 2])]);

        assert_eq!(idx.probe(&system("nl")), Some(&[0, 2][..]));
        assert_eq!(idx.probe(&system("missing")), Some(&[][..]));
        assert_eq!(idx.probe(&blocks(&[1])), None);
        assert_eq!(idx.probe(&named("b")), Some(&[1][..]));
    }

    #[test]
    fn candidates_intersect_exact_conditions() {
        let mut idx = index();
        idx.insert(0, &[system("nl"), named("a"), blocks(&[1])]);
        idx.insert(1, &[system("nl"), named("b"), blocks(&[2])]);

        assert_eq!(idx.candidates(&[system("nl"), named("b")]), Candidates::Some(vec![1]));
        assert_eq!(idx.candidates(&[blocks(&[1])]), Candidates::All);
        assert_eq!(idx.candidates(&[]), Candidates::All);
        assert_eq!(idx.candidates(&[system("aux"), blocks(&[1])]), Candidates::Some(vec![]));
    }

    #[test]
    fn replace_moves_object_between_buckets() {
        let mut idx = index();
        let before = [system("nl"), named("a"), blocks(&[1])];
        let after = [system("aux"), named("a"), blocks(&[1])];
        idx.insert(0, &before);
        idx.insert(1, &[system("nl"), named("b"), blocks(&[1])]);

        idx.replace(0, &before, &after);

        assert_eq!(idx.probe(&system("nl")), Some(&[1][..]));
        assert_eq!(idx.probe(&system("aux")), Some(&[0][..]));
        assert_eq!(idx.probe(&named("a")), Some(&[0][..]));
    }

    #[test]
    fn candidate_len_counts_all_as_total() {
        assert_eq!(Candidates::All.len(10), 10);
        assert_eq!(Candidates::Some(vec![1, 2]).len(10), 2);
    }
}
