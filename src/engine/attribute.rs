//! # Attributes
//!
//! An attribute is a typed piece of metadata extracted from a stored object
//! (its blocks, its system name, the tags it participates in, ...). The same
//! attribute type plays two roles:
//!
//! * **stored**: one instance per (object, kind), filled by
//!   [`Attribute::init_from`] when the object is added or updated;
//! * **probe**: an instance built by the caller and appended to a
//!   [`Query`](crate::Query) as a condition.
//!
//! Matching is asymmetric: `stored.is_match(probe)` answers "does the stored
//! metadata satisfy the probe's condition". Equality ([`Attribute::is_equal`])
//! is only used for cache keys and registration checks.
//!
//! ## Binding
//! A bare attribute knows nothing about kind ids. [`BoundAttribute`] pairs a
//! boxed attribute with the [`KindId`] it was registered under and the
//! [`WarehouseId`] it belongs to; the warehouse rejects bound attributes that
//! carry a foreign warehouse id.
//!
//! ## Cache keys
//! [`ConditionKey`] wraps an ordered condition list and implements `Hash` and
//! `Eq` so it can key the query-id map. Order is part of the key.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::engine::object::WarehouseObject;
use crate::engine::types::{KindId, WarehouseId, hash_combine};


/// How the index accelerates lookups for a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum IndexTier {
    /// Stored values are bucketed by `hash_value`; a probe looks up its own
    /// hash. Only valid when `is_match` is equivalent to `is_equal`.
    Exact,

    /// Every object is a candidate; matching is decided by `is_match`.
    #[default]
    Scan,
}

/// Polymorphic metadata predicate tracked for every stored object.
///
/// ## Contract
/// * `hash_value` is deterministic and depends only on the attribute's data.
/// * `is_equal(a, b)` implies `a.hash_value() == b.hash_value()`.
/// * `clone_box` returns a deep, independent copy that `is_equal`s `self`.
/// * Kinds reporting [`IndexTier::Exact`] must have `is_match == is_equal`.
///
/// Implementations compare against `other` by downcasting through
/// [`Attribute::as_any`]; an `other` of a different type never matches.

pub trait Attribute: fmt::Debug + Send + Sync + 'static {
    /// Deterministic digest of the attribute's data.
    fn hash_value(&self) -> u64;

    /// Reads and stores the metadata this attribute tracks from `object`.
    ///
    /// `system` is the system name passed to `Warehouse::add`.
    fn init_from(&mut self, object: &dyn WarehouseObject, system: &str);

    /// Returns `true` if this stored metadata satisfies the condition `probe`.
    fn is_match(&self, probe: &dyn Attribute) -> bool;

    /// Returns `true` if `other` holds identical metadata.
    fn is_equal(&self, other: &dyn Attribute) -> bool;

    /// Deep copy behind a fresh box.
    fn clone_box(&self) -> Box<dyn Attribute>;

    /// Downcasting hook.
    fn as_any(&self) -> &dyn Any;

    /// Index tier used for this kind. Read once from the registered prototype.
    fn index_tier(&self) -> IndexTier { IndexTier::Scan }
}

impl Clone for Box<dyn Attribute> {
    fn clone(&self) -> Self { self.clone_box() }
}

/// Downcasts `other` to `T` if it has that concrete type.
#[inline]
pub fn downcast_attribute<T: Attribute>(other: &dyn Attribute) -> Option<&T> {
    other.as_any().downcast_ref::<T>()
}

/// An attribute tied to a kind id of one specific warehouse.
pub struct BoundAttribute {
    kind: KindId,
    warehouse: WarehouseId,
    value: Box<dyn Attribute>,
}

impl BoundAttribute {
    pub(crate) fn new(kind: KindId, warehouse: WarehouseId, value: Box<dyn Attribute>) -> Self {
        Self { kind, warehouse, value }
    }

    /// Kind id this attribute was registered under.
    #[inline]
    pub fn kind(&self) -> KindId { self.kind }

    /// Warehouse this attribute belongs to.
    #[inline]
    pub fn warehouse(&self) -> WarehouseId { self.warehouse }

    /// The wrapped attribute.
    #[inline]
    pub fn value(&self) -> &dyn Attribute { self.value.as_ref() }

    /// Downcasts the wrapped attribute.
    #[inline]
    pub fn downcast<T: Attribute>(&self) -> Option<&T> {
        downcast_attribute::<T>(self.value.as_ref())
    }

    /// Hash combining the attribute digest with its kind id.
    #[inline]
    pub fn keyed_hash(&self) -> u64 {
        hash_combine(self.value.hash_value(), self.kind as u64)
    }

    /// Refreshes the wrapped attribute from `object`.
    #[inline]
    pub(crate) fn init_from(&mut self, object: &dyn WarehouseObject, system: &str) {
        self.value.init_from(object, system);
    }

    /// `self` (stored) satisfies `probe`. Different kinds never match.
    #[inline]
    pub fn is_match(&self, probe: &BoundAttribute) -> bool {
        self.kind == probe.kind && self.value.is_match(probe.value.as_ref())
    }
}

impl Clone for BoundAttribute {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            warehouse: self.warehouse,
            value: self.value.clone_box(),
        }
    }
}

impl PartialEq for BoundAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value.is_equal(other.value.as_ref())
    }
}

impl Eq for BoundAttribute {}

impl Hash for BoundAttribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.keyed_hash());
    }
}

impl fmt::Debug for BoundAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundAttribute")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .finish()
    }
}

/// Ordered condition list used as a query-cache key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionKey {
    conditions: Vec<BoundAttribute>,
}

impl ConditionKey {
    /// Builds a key from `conditions` in the given order.
    pub fn ordered(conditions: &[BoundAttribute]) -> Self {
        Self { conditions: conditions.to_vec() }
    }

    /// Builds a key with conditions stably sorted by kind id, so lists that
    /// differ only in the order of different kinds share one key.
    pub fn canonical(conditions: &[BoundAttribute]) -> Self {
        Self::from_refs(&Self::key_order(conditions, true))
    }

    /// References to `conditions` in key order.
    pub fn key_order(conditions: &[BoundAttribute], canonical: bool) -> Vec<&BoundAttribute> {
        let mut refs: Vec<&BoundAttribute> = conditions.iter().collect();
        if canonical {
            refs.sort_by_key(|c| c.kind());
        }
        refs
    }

    pub(crate) fn from_refs(conditions: &[&BoundAttribute]) -> Self {
        Self { conditions: conditions.iter().map(|&c| c.clone()).collect() }
    }

    /// Order-sensitive digest of a condition sequence.
    pub fn digest<'a>(conditions: impl IntoIterator<Item = &'a BoundAttribute>) -> u64 {
        conditions
            .into_iter()
            .fold(0u64, |h, condition| hash_combine(h, condition.keyed_hash()))
    }

    /// `true` if this key equals `conditions` element-wise.
    pub fn matches(&self, conditions: &[&BoundAttribute]) -> bool {
        self.conditions.len() == conditions.len()
            && self.conditions.iter().zip(conditions).all(|(a, &b)| a == b)
    }

    /// The conditions in key order.
    #[inline]
    pub fn conditions(&self) -> &[BoundAttribute] { &self.conditions }
}

impl Hash for ConditionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(Self::digest(&self.conditions));
    }
}
