//! Insertable objects.
//!
//! [`WarehouseObject`] is the contract every object stored in a warehouse
//! fulfils. The warehouse itself only needs three things from an object:
//!
//! * a stable identity (the address of its shared allocation),
//! * an `enabled` flag that is read fresh on every query retrieval,
//! * whatever state the registered attribute kinds read in `init_from`.
//!
//! The capability accessors (`blocks`, `boundaries`, `tags`, ...) default to
//! `None` and exist for the built-in attribute kinds in
//! [`crate::attributes`]. Custom kinds may instead downcast through
//! [`AsAny::as_any`].

use std::any::{Any, type_name};
use std::sync::Arc;

use bitflags::bitflags;


/// Mesh subdomain (block) identifier.
pub type BlockId = u16;

/// Mesh boundary identifier.
pub type BoundaryId = i16;

/// Tag name an object participates in.
pub type TagName = String;

/// Points in the execution cycle at which an object runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExecFlag {
    /// Never executed automatically.
    None,
    /// Once during initial setup.
    Initial,
    /// Every linear iteration.
    Linear,
    /// Every nonlinear iteration.
    Nonlinear,
    /// Start of every timestep.
    TimestepBegin,
    /// End of every timestep.
    TimestepEnd,
    /// Once after the final timestep.
    Final,
    /// Whenever explicitly requested by the caller.
    Custom,
    /// Matches every execution point.
    Always,
}

bitflags! {
    /// Interfaces an object implements, used for coarse type filtering.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Interfaces: u32 {
        /// Generic user object.
        const USER_OBJECT            = 1 << 0;
        /// Loops over elements.
        const ELEMENT                = 1 << 1;
        /// Loops over boundary sides.
        const SIDE                   = 1 << 2;
        /// Loops over internal sides.
        const INTERNAL_SIDE          = 1 << 3;
        /// Loops over interfaces between blocks.
        const INTERFACE              = 1 << 4;
        /// Loops over nodes.
        const NODAL                  = 1 << 5;
        /// Executes once per invocation.
        const GENERAL                = 1 << 6;
        /// General object executed on every thread.
        const THREADED_GENERAL       = 1 << 7;
        /// Produces a scalar value.
        const POSTPROCESSOR          = 1 << 8;
        /// Produces vector values.
        const VECTOR_POSTPROCESSOR   = 1 << 9;
        /// Produces arbitrary reporter values.
        const REPORTER               = 1 << 10;
        /// Restricted to a subset of blocks.
        const BLOCK_RESTRICTABLE     = 1 << 11;
        /// Restricted to a subset of boundaries.
        const BOUNDARY_RESTRICTABLE  = 1 << 12;
        /// Loops over the whole domain in one pass.
        const DOMAIN                 = 1 << 13;
    }
}

/// Downcasting support for objects stored behind `Arc<dyn WarehouseObject>`.
///
/// Implemented for every `Send + Sync + 'static` type; never implement it by
/// hand.
pub trait AsAny: Any + Send + Sync {
    /// Borrowed view for `downcast_ref`.
    fn as_any(&self) -> &dyn Any;

    /// Owned view for `Arc::downcast`.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Rust type name of the concrete object.
    fn concrete_type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any { self }

    #[inline]
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> { self }

    #[inline]
    fn concrete_type_name(&self) -> &'static str { type_name::<T>() }
}

/// An object that can be stored in and queried from a warehouse.
///
/// ## Contract
/// * `enabled` may change at any time (it is typically backed by an atomic)
///   and is never cached by the warehouse.
/// * Every other accessor is read only when the object is added or
///   explicitly updated. Changing the backing state without calling
///   [`Warehouse::update`](crate::Warehouse::update) leaves query results
///   stale.

pub trait WarehouseObject: AsAny {
    /// Human-readable object name, used for the name attribute and diagnostics.
    fn name(&self) -> &str;

    /// Whether the object currently participates in query results.
    fn enabled(&self) -> bool { true }

    /// Blocks the object is restricted to. `None` if not block restrictable.
    fn blocks(&self) -> Option<Vec<BlockId>> { None }

    /// Boundaries the object is restricted to. `None` if not boundary restrictable.
    fn boundaries(&self) -> Option<Vec<BoundaryId>> { None }

    /// Tags the object participates in.
    fn tags(&self) -> Option<Vec<TagName>> { None }

    /// Execution points the object runs at.
    fn execute_on(&self) -> Option<Vec<ExecFlag>> { None }

    /// Worker thread that owns this copy of the object.
    fn thread_id(&self) -> Option<u32> { None }

    /// Interfaces the object implements.
    fn interfaces(&self) -> Interfaces { Interfaces::empty() }
}

/// Identity key of an object: the address of its shared allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ObjectKey(usize);

impl ObjectKey {
    #[inline]
    pub(crate) fn of(object: &dyn WarehouseObject) -> Self {
        ObjectKey(object as *const dyn WarehouseObject as *const () as usize)
    }
}
