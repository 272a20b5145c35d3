//! Error types for attribute registration and warehouse usage.
//!
//! This module declares focused, composable error types used across the
//! registry, the object store and query execution. Each error carries enough
//! context to make failures actionable while remaining cheap to pass around
//! or convert into the aggregate [`WarehouseError`].
//!
//! ## Taxonomy
//! * **Configuration** ([`RegistrationError`]): unknown attribute names,
//!   unregistered attribute types, name/type conflicts. Setup-time programmer
//!   errors reported synchronously at the call site.
//! * **Usage** ([`UsageError`]): attributes used against the wrong warehouse,
//!   updates of objects that were never added, incompatible result types.
//!   These are precondition violations; they are surfaced as errors and never
//!   degraded into an empty result.
//!
//! A query with zero matches is *not* an error.
//!
//! ## Typical flow
//! Low-level operations return the focused type; orchestration code uses `?`
//! to bubble failures into [`WarehouseError`]:
//! ```ignore
//! fn bind_block(w: &Warehouse, block: BlockId) -> WarehouseResult<BoundAttribute> {
//!     let kind = w.attribute_id("subdomains")?; // RegistrationError -> WarehouseError
//!     Ok(w.bind_kind(kind, Box::new(AttribSubdomains::probe(block)))?)
//! }
//! ```

use thiserror::Error;

use crate::engine::types::{KindId, ObjectId, WarehouseId, KIND_CAP};


/// Configuration errors raised while registering or resolving attribute kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {

    /// No attribute kind was registered under this name.
    #[error("no id exists for unregistered attribute '{name}'")]
    NotRegistered {
        /// Name that was looked up.
        name: String,
    },

    /// The Rust type used to build a condition was never registered.
    #[error("attribute type {type_name} is not registered with this warehouse")]
    TypeNotRegistered {
        /// Rust type name of the attribute.
        type_name: &'static str,
    },

    /// The name is already registered for a different Rust type.
    #[error("attribute '{name}' is already registered as {existing}, cannot register {requested}")]
    NameTypeConflict {
        /// Name being registered.
        name: String,

        /// Type currently registered under `name`.
        existing: &'static str,

        /// Type the caller attempted to register.
        requested: &'static str,
    },

    /// The Rust type is already registered under a different name.
    #[error("attribute type {type_name} is already registered as '{existing}', cannot register as '{requested}'")]
    TypeNameConflict {
        /// Rust type name of the attribute.
        type_name: &'static str,

        /// Name the type is registered under.
        existing: String,

        /// Name the caller attempted to use.
        requested: String,
    },

    /// All `KIND_CAP` kind slots are taken.
    #[error("attribute kind limit reached (capacity {capacity})", capacity = KIND_CAP)]
    CapacityExceeded,
}

/// Precondition violations raised while using a warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {

    /// An attribute built against one warehouse was handed to another.
    #[error("attribute bound to {found} used with {expected}")]
    ForeignAttribute {
        /// Warehouse the operation was invoked on.
        expected: WarehouseId,

        /// Warehouse the attribute was bound to.
        found: WarehouseId,
    },

    /// The object was never added to this warehouse.
    #[error("object '{name}' was never added to this warehouse")]
    UnknownObject {
        /// Name reported by the object.
        name: String,
    },

    /// The object is already stored in this warehouse.
    #[error("object '{name}' is already stored as object {id}")]
    DuplicateObject {
        /// Name reported by the object.
        name: String,

        /// Slot the object already occupies.
        id: ObjectId,
    },

    /// A query result could not be downcast to the requested type.
    #[error("queried object '{object}' has type {found}; expected {expected}")]
    IncompatibleType {
        /// Requested result type.
        expected: &'static str,

        /// Concrete type of the offending object.
        found: &'static str,

        /// Name reported by the offending object.
        object: String,
    },

    /// A boxed attribute was bound to a kind registered for another type.
    #[error("attribute kind {kind} holds {expected} values")]
    KindTypeMismatch {
        /// Kind the attribute was bound to.
        kind: KindId,

        /// Type registered for `kind`.
        expected: &'static str,
    },

    /// A kind id outside the registered range was supplied.
    #[error("attribute kind {kind} out of range ({registered} kinds registered)")]
    KindOutOfRange {
        /// Offending kind id.
        kind: KindId,

        /// Number of registered kinds.
        registered: usize,
    },
}

/// Aggregate error for every fallible warehouse operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarehouseError {

    /// Attribute registration or lookup failed.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// A warehouse precondition was violated.
    #[error(transparent)]
    Usage(#[from] UsageError),
}

/// Result alias used throughout the crate.
pub type WarehouseResult<T> = Result<T, WarehouseError>;
