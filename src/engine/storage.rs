//! Object store.
//!
//! The authoritative record of every object added to a warehouse:
//!
//! ```text
//! objects[id]    : Arc<dyn WarehouseObject>
//! systems[id]    : system name given to `add`
//! attributes[id] : one BoundAttribute per registered kind, indexed by kind id
//! ids            : object identity -> id
//! index          : exact-tier buckets over `attributes`
//! ```
//!
//! Slots are dense and never freed; objects are never removed. An object's
//! attribute vector is only ever replaced as a whole.
//!
//! Matching reads `attributes` directly: the index narrows the candidates,
//! `is_match` decides.

use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::engine::attribute::BoundAttribute;
use crate::engine::error::UsageError;
use crate::engine::index::{AttributeIndex, Candidates};
use crate::engine::object::{ObjectKey, WarehouseObject};
use crate::engine::registry::AttributeRegistry;
use crate::engine::types::{KindId, ObjectId};


/// Dense storage of objects and their captured attributes.
pub struct ObjectStore {
    objects: Vec<Arc<dyn WarehouseObject>>,
    systems: Vec<String>,
    attributes: Vec<Vec<BoundAttribute>>,
    ids: FxHashMap<ObjectKey, ObjectId>,
    index: AttributeIndex,
}

impl ObjectStore {
    /// Creates an empty store indexing the kinds of `registry`.
    pub fn new(registry: &AttributeRegistry) -> Self {
        let tiers = registry.descs().iter().map(|d| d.tier).collect();
        Self {
            objects: Vec::new(),
            systems: Vec::new(),
            attributes: Vec::new(),
            ids: FxHashMap::default(),
            index: AttributeIndex::new(tiers),
        }
    }

    /// Number of stored objects.
    #[inline]
    pub fn len(&self) -> usize { self.objects.len() }

    /// Returns `true` if no object is stored.
    #[inline]
    pub fn is_empty(&self) -> bool { self.objects.is_empty() }

    /// Slot of `object`, if stored.
    #[inline]
    pub fn id_of(&self, object: &dyn WarehouseObject) -> Option<ObjectId> {
        self.ids.get(&ObjectKey::of(object)).copied()
    }

    /// Object stored in slot `id`.
    #[inline]
    pub fn object(&self, id: ObjectId) -> Option<&Arc<dyn WarehouseObject>> {
        self.objects.get(id as usize)
    }

    /// Captured attribute of kind `kind` for object `id`.
    #[inline]
    pub fn attribute(&self, id: ObjectId, kind: KindId) -> Option<&BoundAttribute> {
        self.attributes.get(id as usize)?.get(kind as usize)
    }

    /// Appends `object` with its captured `attributes` and indexes them.
    ///
    /// ## Errors
    /// `DuplicateObject` if the same allocation is already stored.
    pub fn push(
        &mut self,
        object: Arc<dyn WarehouseObject>,
        system: &str,
        attributes: Vec<BoundAttribute>,
    ) -> Result<ObjectId, UsageError> {
        let key = ObjectKey::of(object.as_ref());
        if let Some(&id) = self.ids.get(&key) {
            return Err(UsageError::DuplicateObject { name: object.name().to_string(), id });
        }

        let id = self.objects.len() as ObjectId;
        self.index.insert(id, &attributes);
        self.ids.insert(key, id);
        self.objects.push(object);
        self.systems.push(system.to_string());
        self.attributes.push(attributes);
        Ok(id)
    }

    /// Replaces the attribute vector of object `id` and re-indexes it.
    pub fn replace(&mut self, id: ObjectId, attributes: Vec<BoundAttribute>) {
        let slot = &mut self.attributes[id as usize];
        self.index.replace(id, slot, &attributes);
        *slot = attributes;
    }

    /// System name object `id` was added under.
    #[inline]
    pub fn system(&self, id: ObjectId) -> Option<&str> {
        self.systems.get(id as usize).map(String::as_str)
    }

    /// Objects whose attributes satisfy every condition, in slot order.
    ///
    /// Enabled-ness is not considered. Candidate sets above
    /// `parallel_threshold` are validated on the rayon pool.
    pub fn matching(&self, conditions: &[BoundAttribute], parallel_threshold: usize) -> Vec<Arc<dyn WarehouseObject>> {
        self.matching_ids(conditions, parallel_threshold)
            .into_iter()
            .map(|id| Arc::clone(&self.objects[id as usize]))
            .collect()
    }

    /// Slot ids whose attributes satisfy every condition, ascending.
    pub fn matching_ids(&self, conditions: &[BoundAttribute], parallel_threshold: usize) -> Vec<ObjectId> {
        let is_match = |id: &ObjectId| self.satisfies(*id, conditions);

        let candidates = self.index.candidates(conditions);
        let parallel = candidates.len(self.objects.len()) > parallel_threshold;
        match (candidates, parallel) {
            (Candidates::All, true) => (0..self.objects.len() as ObjectId).into_par_iter().filter(is_match).collect(),
            (Candidates::All, false) => (0..self.objects.len() as ObjectId).filter(is_match).collect(),
            (Candidates::Some(ids), true) => ids.into_par_iter().filter(is_match).collect(),
            (Candidates::Some(ids), false) => ids.into_iter().filter(is_match).collect(),
        }
    }

    /// `true` if every condition matches the stored attribute of its kind.
    #[inline]
    fn satisfies(&self, id: ObjectId, conditions: &[BoundAttribute]) -> bool {
        let stored = &self.attributes[id as usize];
        conditions.iter().all(|condition| {
            stored
                .get(condition.kind() as usize)
                .is_some_and(|attribute| attribute.is_match(condition))
        })
    }
}
