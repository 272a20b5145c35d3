//! Query construction and execution.
//!
//! A [`Query`] is a builder-style list of conditions bound to one
//! [`Warehouse`]. Conditions are appended with [`Query::condition`] and the
//! query is executed any number of times with [`Query::query_into`],
//! [`Query::count`] or [`Query::objects`].
//!
//! ## Semantics
//! * An object matches when, for every condition `c`, the object's stored
//!   attribute of `c`'s kind satisfies `c`.
//! * An empty query matches every object.
//! * Retrieval filters by the objects' *current* `enabled` flag;
//!   [`Query::query_all_into`] skips that filter.
//!
//! ## Cloning
//! `Clone` deep-copies the condition list. Conditions appended to the clone
//! never affect the original, so a common prefix can be shared:
//!
//! ```
//! # use object_warehouse::{WarehouseBuilder, attributes::{AttribSystem, AttribSubdomains}};
//! # let mut b = WarehouseBuilder::new();
//! # b.register_attribute("system", AttribSystem::default())?;
//! # b.register_attribute("subdomains", AttribSubdomains::default())?;
//! # let warehouse = b.build();
//! let base = warehouse.query().condition(AttribSystem::new("nl"))?;
//! let block1 = base.clone().condition(AttribSubdomains::probe(1))?;
//! let block2 = base.clone().condition(AttribSubdomains::probe(2))?;
//! assert_eq!((base.len(), block1.len(), block2.len()), (1, 2, 2));
//! # Ok::<(), object_warehouse::WarehouseError>(())
//! ```

use std::sync::Arc;

use crate::engine::attribute::{Attribute, BoundAttribute};
use crate::engine::error::WarehouseResult;
use crate::engine::manager::Warehouse;
use crate::engine::object::WarehouseObject;
use crate::engine::types::KindSet;


/// Builder of condition lists executed against one warehouse.
///
/// The builder borrows its warehouse, so a query can never outlive it.
#[derive(Clone)]
pub struct Query<'w> {
    warehouse: &'w Warehouse,
    conditions: Vec<BoundAttribute>,
}

impl<'w> Query<'w> {
    /// Creates an empty query. Prefer [`Warehouse::query`].
    pub fn new(warehouse: &'w Warehouse) -> Self {
        Self { warehouse, conditions: Vec::new() }
    }

    /// Appends `value` as a condition of the kind registered for `T`.
    ///
    /// ## Errors
    /// `TypeNotRegistered` if `T` was never registered with this warehouse.
    pub fn condition<T: Attribute>(mut self, value: T) -> WarehouseResult<Self> {
        self.conditions.push(self.warehouse.bind(value)?);
        Ok(self)
    }

    /// Appends an already bound condition.
    ///
    /// ## Errors
    /// `ForeignAttribute` if `condition` was bound against another warehouse.
    pub fn condition_bound(mut self, condition: BoundAttribute) -> WarehouseResult<Self> {
        self.warehouse.registry().check(&condition)?;
        self.conditions.push(condition);
        Ok(self)
    }

    /// Warehouse the query runs against.
    #[inline]
    pub fn warehouse(&self) -> &'w Warehouse { self.warehouse }

    /// Deep copy of the conditions, in insertion order.
    pub fn attributes(&self) -> Vec<BoundAttribute> { self.conditions.clone() }

    /// Borrowed view of the conditions.
    #[inline]
    pub fn conditions(&self) -> &[BoundAttribute] { &self.conditions }

    /// Kinds constrained by at least one condition.
    pub fn kinds(&self) -> KindSet {
        self.conditions.iter().map(BoundAttribute::kind).collect()
    }

    /// Number of conditions.
    #[inline]
    pub fn len(&self) -> usize { self.conditions.len() }

    /// Returns `true` if the query has no condition (it matches everything).
    #[inline]
    pub fn is_empty(&self) -> bool { self.conditions.is_empty() }

    /// Number of enabled objects matching the query.
    pub fn count(&self) -> WarehouseResult<usize> {
        self.warehouse.count(&self.conditions)
    }

    /// Clears `results` and fills it with the enabled matching objects,
    /// downcast to `T`, in insertion order.
    ///
    /// ## Errors
    /// `IncompatibleType` if a matching enabled object is not a `T`. The
    /// contents of `results` are unspecified in that case.
    pub fn query_into<'r, T: WarehouseObject>(&self, results: &'r mut Vec<Arc<T>>) -> WarehouseResult<&'r mut Vec<Arc<T>>> {
        self.warehouse.query_into(&self.conditions, results)
    }

    /// Like [`query_into`](Self::query_into) but ignores the `enabled` flag.
    pub fn query_all_into<'r, T: WarehouseObject>(&self, results: &'r mut Vec<Arc<T>>) -> WarehouseResult<&'r mut Vec<Arc<T>>> {
        self.warehouse.query_all_into(&self.conditions, results)
    }

    /// Enabled matching objects, without downcasting.
    pub fn objects(&self) -> WarehouseResult<Vec<Arc<dyn WarehouseObject>>> {
        self.warehouse.objects(&self.conditions)
    }
}

impl std::fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("warehouse", &self.warehouse.id())
            .field("conditions", &self.conditions)
            .finish()
    }
}
