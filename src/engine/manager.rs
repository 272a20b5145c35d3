//! Warehouse construction and orchestration.
//!
//! This module defines the central orchestration layer, responsible for:
//!
//! * sealing attribute registration into an immutable registry
//!   ([`WarehouseBuilder`] → [`Warehouse`]),
//! * capturing one attribute per kind for every added or updated object,
//! * assigning query ids to distinct condition lists,
//! * memoizing the match set of every query id,
//! * filtering memoized results by the live `enabled` flag.
//!
//! ## Lifecycle
//!
//! ```text
//! WarehouseBuilder::new()
//!     .register_attribute::<T>(name, prototype)   (setup phase, repeatable)
//!     .build()                                     (seals the registry)
//! Warehouse::add / update                          (main thread, between parallel phases)
//! Warehouse::query().condition(..)?.query_into()   (any thread)
//! ```
//!
//! ## Concurrency model
//!
//! `Warehouse` is `Send + Sync`. Three independent locks keep contention low:
//!
//! | Lock | Guards | Held |
//! |------|--------|------|
//! | `store` (`RwLock`) | objects, attribute vectors, identity map, index | write during add/update, read while a match set is first computed |
//! | `query_ids` (`Mutex`) | condition list → query id | only for the lookup/insert |
//! | `results` (`Mutex`) | query id → match set | while a match set is computed or copied out |
//!
//! Lock order is `results` → `store`. Mutations never hold two locks at once.
//!
//! Queries that happen-after a mutation observe it. Queries concurrent with a
//! mutation are data-race free but may observe either state; callers separate
//! mutation and parallel querying with a synchronization point.
//!
//! ## Cache invalidation
//!
//! Every `add` and `update` drops all query ids and all memoized match sets.
//! Query ids keep increasing across invalidations, so an id obtained just
//! before an invalidation can never name another condition list afterwards.

use std::any::type_name;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::engine::attribute::{Attribute, BoundAttribute, ConditionKey};
use crate::engine::config::WarehouseConfig;
use crate::engine::error::{UsageError, WarehouseResult};
use crate::engine::object::WarehouseObject;
use crate::engine::query::Query;
use crate::engine::registry::{AttributeDesc, AttributeRegistry};
use crate::engine::storage::ObjectStore;
use crate::engine::types::{KindId, ObjectId, QueryId, WarehouseId};
use crate::profiling::profiler;


/// Setup phase of a warehouse: attribute kinds are registered here.
///
/// ## Example
/// ```
/// use object_warehouse::{WarehouseBuilder, attributes::{AttribSystem, AttribSubdomains}};
///
/// let mut builder = WarehouseBuilder::new();
/// let system = builder.register_attribute("system", AttribSystem::default())?;
/// let blocks = builder.register_attribute("subdomains", AttribSubdomains::default())?;
/// assert_eq!((system, blocks), (0, 1));
///
/// let warehouse = builder.build();
/// assert_eq!(warehouse.attribute_id("subdomains")?, blocks);
/// # Ok::<(), object_warehouse::WarehouseError>(())
/// ```

pub struct WarehouseBuilder {
    registry: AttributeRegistry,
    config: WarehouseConfig,
}

impl Default for WarehouseBuilder {
    fn default() -> Self { Self::new() }
}

impl WarehouseBuilder {
    /// Starts a new setup phase with the default configuration.
    pub fn new() -> Self {
        Self {
            registry: AttributeRegistry::new(WarehouseId::next()),
            config: WarehouseConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: WarehouseConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers attribute type `T` under `name`; `prototype` plays the role
    /// of the constructor arguments.
    ///
    /// Idempotent by name: a second registration of `name` returns the
    /// existing id and keeps the first prototype.
    pub fn register_attribute<T: Attribute>(&mut self, name: &str, prototype: T) -> WarehouseResult<KindId> {
        Ok(self.registry.register(name, prototype)?)
    }

    /// Id registered under `name`.
    pub fn attribute_id(&self, name: &str) -> WarehouseResult<KindId> {
        Ok(self.registry.id_of_name(name)?)
    }

    /// Number of kinds registered so far.
    pub fn attribute_count(&self) -> usize { self.registry.len() }

    /// Seals the registry and returns the warehouse.
    pub fn build(self) -> Warehouse {
        let store = ObjectStore::new(&self.registry);
        debug!(
            warehouse = %self.registry.warehouse(),
            kinds = self.registry.len(),
            "warehouse sealed"
        );
        Warehouse {
            id: self.registry.warehouse(),
            store: RwLock::new(store),
            registry: self.registry,
            config: self.config,
            query_ids: Mutex::new(QueryIds::default()),
            results: Mutex::new(FxHashMap::default()),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }
}

/// Assigns ids to distinct condition lists.
///
/// Keys are bucketed by digest so lookups compare borrowed conditions and
/// only clone them on insertion.
#[derive(Default)]
struct QueryIds {
    next: QueryId,
    buckets: FxHashMap<u64, Vec<(ConditionKey, QueryId)>>,
    len: usize,
}

impl QueryIds {
    fn get_or_insert(&mut self, key: &[&BoundAttribute]) -> (QueryId, bool) {
        let digest = ConditionKey::digest(key.iter().copied());
        let bucket = self.buckets.entry(digest).or_default();
        if let Some((_, id)) = bucket.iter().find(|(k, _)| k.matches(key)) {
            return (*id, false);
        }
        let id = self.next;
        self.next += 1;
        self.len += 1;
        bucket.push((ConditionKey::from_refs(key), id));
        (id, true)
    }

    fn clear(&mut self) -> usize {
        self.buckets.clear();
        std::mem::take(&mut self.len)
    }
}

/// Snapshot of warehouse counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WarehouseStats {
    /// Objects stored.
    pub objects: usize,

    /// Attribute kinds registered.
    pub kinds: usize,

    /// Condition lists with a memoized match set.
    pub cached_queries: usize,

    /// Retrievals answered from the cache.
    pub cache_hits: u64,

    /// Retrievals that had to compute a match set.
    pub cache_misses: u64,
}

/// Thread-safe registry of objects answering memoized attribute queries.
pub struct Warehouse {
    id: WarehouseId,
    registry: AttributeRegistry,
    config: WarehouseConfig,
    store: RwLock<ObjectStore>,
    query_ids: Mutex<QueryIds>,
    results: Mutex<FxHashMap<QueryId, Vec<Arc<dyn WarehouseObject>>>>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl Warehouse {
    /// Starts a setup phase. Same as [`WarehouseBuilder::new`].
    pub fn builder() -> WarehouseBuilder { WarehouseBuilder::new() }

    /// Identity of this warehouse.
    #[inline]
    pub fn id(&self) -> WarehouseId { self.id }

    /// Configuration the warehouse was built with.
    #[inline]
    pub fn config(&self) -> &WarehouseConfig { &self.config }

    /// Sealed attribute registry.
    #[inline]
    pub fn registry(&self) -> &AttributeRegistry { &self.registry }

    /// Id registered under `name`.
    pub fn attribute_id(&self, name: &str) -> WarehouseResult<KindId> {
        Ok(self.registry.id_of_name(name)?)
    }

    /// Id registered for attribute type `T`.
    pub fn kind_of<T: Attribute>(&self) -> WarehouseResult<KindId> {
        Ok(self.registry.id_of::<T>()?)
    }

    /// Descriptors of every registered kind, in id order.
    pub fn kinds(&self) -> &[AttributeDesc] { self.registry.descs() }

    /// Number of registered kinds.
    pub fn attribute_count(&self) -> usize { self.registry.len() }

    /// Binds `value` as a condition or override for this warehouse.
    pub fn bind<T: Attribute>(&self, value: T) -> WarehouseResult<BoundAttribute> {
        Ok(self.registry.bind(value)?)
    }

    /// Binds a boxed attribute to kind `kind`. Its dynamic type must be the
    /// type registered for that kind.
    pub fn bind_kind(&self, kind: KindId, value: Box<dyn Attribute>) -> WarehouseResult<BoundAttribute> {
        self.registry.bind_kind(kind, value)
    }

    /// Binds a boxed attribute to the kind registered under `name`.
    pub fn bind_named(&self, name: &str, value: Box<dyn Attribute>) -> WarehouseResult<BoundAttribute> {
        let kind = self.registry.id_of_name(name)?;
        self.registry.bind_kind(kind, value)
    }

    /// Returns a fresh, empty query bound to this warehouse.
    pub fn query(&self) -> Query<'_> { Query::new(self) }

    /// Number of stored objects, enabled or not.
    pub fn len(&self) -> usize { self.store.read().len() }

    /// Returns `true` if no object has been added.
    pub fn is_empty(&self) -> bool { self.store.read().is_empty() }

    /// Slot of `object`, if it was added.
    pub fn id_of(&self, object: &dyn WarehouseObject) -> Option<ObjectId> {
        self.store.read().id_of(object)
    }

    /// Object stored in slot `id`.
    pub fn object(&self, id: ObjectId) -> Option<Arc<dyn WarehouseObject>> {
        self.store.read().object(id).cloned()
    }

    /// Copy of the attribute of kind `kind` captured for `object`.
    pub fn attribute_of(&self, object: &dyn WarehouseObject, kind: KindId) -> WarehouseResult<BoundAttribute> {
        let store = self.store.read();
        let id = store
            .id_of(object)
            .ok_or_else(|| UsageError::UnknownObject { name: object.name().to_string() })?;
        store
            .attribute(id, kind)
            .cloned()
            .ok_or_else(|| UsageError::KindOutOfRange { kind, registered: self.registry.len() }.into())
    }

    /// Number of condition lists with a memoized match set.
    pub fn cached_query_count(&self) -> usize { self.results.lock().len() }

    /// Snapshot of counters.
    pub fn stats(&self) -> WarehouseStats {
        WarehouseStats {
            objects: self.len(),
            kinds: self.registry.len(),
            cached_queries: self.cached_query_count(),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }
}

impl Warehouse {
    /// Adds `object`, capturing one attribute per registered kind.
    ///
    /// `system` is recorded with the object and handed to every
    /// `init_from` call, now and on later updates.
    ///
    /// ## Errors
    /// `DuplicateObject` if the same allocation was already added.
    pub fn add(&self, object: Arc<dyn WarehouseObject>, system: &str) -> WarehouseResult<ObjectId> {
        let _span = profiler::span("Warehouse::add");

        let attributes = self.read_attributes(object.as_ref(), system);
        let name = object.name().to_string();
        let id = self.store.write().push(object, system, attributes)?;

        debug!(warehouse = %self.id, object = %name, id, system, "added object");
        self.invalidate();
        Ok(id)
    }

    /// Re-captures every attribute of `object` from its current state.
    ///
    /// ## Errors
    /// `UnknownObject` if `object` was never added.
    pub fn update(&self, object: &dyn WarehouseObject) -> WarehouseResult<()> {
        self.update_inner(object, None)
    }

    /// Re-captures every attribute of `object`, then replaces the attribute
    /// of `extra`'s kind with `extra`.
    ///
    /// ## Errors
    /// `ForeignAttribute` if `extra` belongs to another warehouse,
    /// `UnknownObject` if `object` was never added.
    pub fn update_with(&self, object: &dyn WarehouseObject, extra: &BoundAttribute) -> WarehouseResult<()> {
        self.registry.check(extra)?;
        self.update_inner(object, Some(extra))
    }

    fn update_inner(&self, object: &dyn WarehouseObject, extra: Option<&BoundAttribute>) -> WarehouseResult<()> {
        let _span = profiler::span("Warehouse::update");

        let id = {
            let mut store = self.store.write();
            let id = store
                .id_of(object)
                .ok_or_else(|| UsageError::UnknownObject { name: object.name().to_string() })?;
            let system = store.system(id).unwrap_or_default().to_string();

            let mut attributes = self.read_attributes(object, &system);
            if let Some(extra) = extra {
                attributes[extra.kind() as usize] = extra.clone();
            }
            store.replace(id, attributes);
            id
        };

        debug!(warehouse = %self.id, object = object.name(), id, "updated object");
        self.invalidate();
        Ok(())
    }

    /// Number of enabled objects matching `conditions`.
    pub fn count(&self, conditions: &[BoundAttribute]) -> WarehouseResult<usize> {
        self.resolve(conditions, |objects| objects.iter().filter(|o| o.enabled()).count())
    }

    /// Enabled objects matching `conditions`, downcast to `T`, written into
    /// `results` (cleared first).
    ///
    /// ## Errors
    /// `IncompatibleType` if a matching enabled object is not a `T`.
    pub fn query_into<'r, T: WarehouseObject>(
        &self,
        conditions: &[BoundAttribute],
        results: &'r mut Vec<Arc<T>>,
    ) -> WarehouseResult<&'r mut Vec<Arc<T>>> {
        self.collect_into(conditions, results, false)
    }

    /// Like [`query_into`](Self::query_into) but includes disabled objects.
    pub fn query_all_into<'r, T: WarehouseObject>(
        &self,
        conditions: &[BoundAttribute],
        results: &'r mut Vec<Arc<T>>,
    ) -> WarehouseResult<&'r mut Vec<Arc<T>>> {
        self.collect_into(conditions, results, true)
    }

    /// Enabled objects matching `conditions`, untyped.
    pub fn objects(&self, conditions: &[BoundAttribute]) -> WarehouseResult<Vec<Arc<dyn WarehouseObject>>> {
        self.resolve(conditions, |objects| {
            objects.iter().filter(|o| o.enabled()).cloned().collect()
        })
    }

    fn collect_into<'r, T: WarehouseObject>(
        &self,
        conditions: &[BoundAttribute],
        results: &'r mut Vec<Arc<T>>,
        show_all: bool,
    ) -> WarehouseResult<&'r mut Vec<Arc<T>>> {
        results.clear();
        self.resolve(conditions, |objects| {
            results.reserve(objects.len());
            for object in objects {
                if !(show_all || object.enabled()) {
                    continue;
                }
                let typed = Arc::clone(object)
                    .into_any_arc()
                    .downcast::<T>()
                    .map_err(|_| UsageError::IncompatibleType {
                        expected: type_name::<T>(),
                        found: (**object).concrete_type_name(),
                        object: object.name().to_string(),
                    })?;
                results.push(typed);
            }
            Ok::<(), UsageError>(())
        })??;
        Ok(results)
    }

    /// Resolves `conditions` to their match set and hands it to `f` while the
    /// result-cache lock is held.
    fn resolve<R>(
        &self,
        conditions: &[BoundAttribute],
        f: impl FnOnce(&[Arc<dyn WarehouseObject>]) -> R,
    ) -> WarehouseResult<R> {
        let _span = profiler::span("Warehouse::resolve").arg("conditions", conditions.len() as u64);

        for condition in conditions {
            self.registry.check(condition)?;
        }

        if !self.config.cache_results {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
            let objects = self.compute(conditions);
            return Ok(f(&objects));
        }

        let query_id = self.query_id(conditions);

        let mut results = self.results.lock();
        if let Some(objects) = results.get(&query_id) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            trace!(warehouse = %self.id, query_id, "query cache hit");
            return Ok(f(objects));
        }

        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        let objects = results.entry(query_id).or_insert_with(|| self.compute(conditions));
        Ok(f(objects))
    }

    /// Looks up or assigns the query id of `conditions`.
    fn query_id(&self, conditions: &[BoundAttribute]) -> QueryId {
        let key = ConditionKey::key_order(conditions, self.config.canonicalize_conditions);
        let (id, fresh) = self.query_ids.lock().get_or_insert(&key);
        if fresh {
            debug!(warehouse = %self.id, query_id = id, conditions = key.len(), "assigned query id");
        }
        id
    }

    fn compute(&self, conditions: &[BoundAttribute]) -> Vec<Arc<dyn WarehouseObject>> {
        self.store
            .read()
            .matching(conditions, self.config.parallel_filter_threshold)
    }

    /// One freshly initialized attribute per registered kind, in id order.
    fn read_attributes(&self, object: &dyn WarehouseObject, system: &str) -> Vec<BoundAttribute> {
        (0..self.registry.len() as KindId)
            .filter_map(|kind| self.registry.instantiate(kind))
            .map(|mut attribute| {
                attribute.init_from(object, system);
                attribute
            })
            .collect()
    }

    /// Drops every query id and memoized match set.
    fn invalidate(&self) {
        let ids = self.query_ids.lock().clear();
        let lists = {
            let mut results = self.results.lock();
            let n = results.len();
            results.clear();
            n
        };
        if ids > 0 || lists > 0 {
            debug!(warehouse = %self.id, query_ids = ids, result_sets = lists, "query cache invalidated");
        }
    }
}
