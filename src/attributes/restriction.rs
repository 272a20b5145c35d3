//! Mesh restriction kinds: which blocks and boundaries an object runs on.
//!
//! The stored side is the object's restriction set; the probe holds the
//! single id being asked about. A stored or probed `ANY_*` id matches
//! everything, a probed `INVALID_*` id matches nothing.

use crate::attributes::{ANY_BLOCK_ID, ANY_BOUNDARY_ID, INVALID_BLOCK_ID, INVALID_BOUNDARY_ID};
use crate::engine::attribute::{Attribute, downcast_attribute};
use crate::engine::object::{BlockId, BoundaryId, WarehouseObject};


/// Blocks (subdomains) an object is restricted to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttribSubdomains {
    ids: Vec<BlockId>,
}

impl AttribSubdomains {
    /// Probe for objects running on `block`.
    pub fn probe(block: BlockId) -> Self { Self { ids: vec![block] } }

    /// A stored restriction over `blocks`.
    pub fn stored(blocks: impl IntoIterator<Item = BlockId>) -> Self {
        Self { ids: sorted(blocks) }
    }

    /// Ids held, ascending.
    pub fn ids(&self) -> &[BlockId] { &self.ids }
}

impl Attribute for AttribSubdomains {
    value_attribute!(AttribSubdomains);

    fn init_from(&mut self, object: &dyn WarehouseObject, _system: &str) {
        self.ids = sorted(object.blocks().unwrap_or_default());
    }

    fn is_match(&self, probe: &dyn Attribute) -> bool {
        let Some(&wanted) = downcast_attribute::<Self>(probe).and_then(|p| p.ids.first()) else {
            return false;
        };
        restricted_to(&self.ids, wanted, ANY_BLOCK_ID, INVALID_BLOCK_ID)
    }
}

/// Boundaries an object is restricted to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttribBoundaries {
    ids: Vec<BoundaryId>,
}

impl AttribBoundaries {
    /// Probe for objects running on `boundary`.
    pub fn probe(boundary: BoundaryId) -> Self { Self { ids: vec![boundary] } }

    /// A stored restriction over `boundaries`.
    pub fn stored(boundaries: impl IntoIterator<Item = BoundaryId>) -> Self {
        Self { ids: sorted(boundaries) }
    }

    /// Ids held, ascending.
    pub fn ids(&self) -> &[BoundaryId] { &self.ids }
}

impl Attribute for AttribBoundaries {
    value_attribute!(AttribBoundaries);

    fn init_from(&mut self, object: &dyn WarehouseObject, _system: &str) {
        self.ids = sorted(object.boundaries().unwrap_or_default());
    }

    fn is_match(&self, probe: &dyn Attribute) -> bool {
        let Some(&wanted) = downcast_attribute::<Self>(probe).and_then(|p| p.ids.first()) else {
            return false;
        };
        restricted_to(&self.ids, wanted, ANY_BOUNDARY_ID, INVALID_BOUNDARY_ID)
    }
}

fn sorted<T: Ord>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut ids: Vec<T> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn restricted_to<T: Ord + Copy>(stored: &[T], wanted: T, any: T, invalid: T) -> bool {
    if wanted == invalid {
        return false;
    }
    if wanted == any {
        return true;
    }
    stored.binary_search(&wanted).is_ok() || stored.binary_search(&any).is_ok()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_probe_matches_contained_ids() {
        let stored = AttribSubdomains::stored([2, 1, 2]);
        assert_eq!(stored.ids(), &[1, 2]);
        assert!(stored.is_match(&AttribSubdomains::probe(1)));
        assert!(!stored.is_match(&AttribSubdomains::probe(3)));
        assert!(stored.is_match(&AttribSubdomains::probe(ANY_BLOCK_ID)));
        assert!(!stored.is_match(&AttribSubdomains::probe(INVALID_BLOCK_ID)));
    }

    #[test]
    fn stored_wildcard_matches_every_block() {
        let stored = AttribSubdomains::stored([ANY_BLOCK_ID]);
        assert!(stored.is_match(&AttribSubdomains::probe(40)));
        assert!(!stored.is_match(&AttribSubdomains::probe(INVALID_BLOCK_ID)));
    }

    #[test]
    fn empty_probe_never_matches() {
        let stored = AttribSubdomains::stored([1]);
        assert!(!stored.is_match(&AttribSubdomains::default()));
        assert!(!stored.is_match(&AttribBoundaries::probe(1)));
    }

    #[test]
    fn boundary_wildcards() {
        let stored = AttribBoundaries::stored([-5, 4]);
        assert!(stored.is_match(&AttribBoundaries::probe(-5)));
        assert!(stored.is_match(&AttribBoundaries::probe(ANY_BOUNDARY_ID)));
        assert!(!stored.is_match(&AttribBoundaries::probe(INVALID_BOUNDARY_ID)));
        assert!(!stored.is_match(&AttribBoundaries::probe(0)));
    }

    #[test]
    fn matching_is_not_equality() {
        let stored = AttribSubdomains::stored([1, 2]);
        let probe = AttribSubdomains::probe(1);
        assert!(stored.is_match(&probe));
        assert!(!stored.is_equal(&probe));
    }
}
