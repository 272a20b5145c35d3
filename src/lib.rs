//! # Object Warehouse
//!
//! Thread-safe registry of heterogeneous simulation objects, queried by
//! typed, user-extensible attributes with memoized results.
//!
//! ## Design Goals
//! - Attribute kinds registered once, sealed before the first insertion
//! - Exact-tier hash index with `is_match` revalidation
//! - Query results memoized per condition list, filtered live by `enabled`
//! - Concurrent read access from worker threads
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use object_warehouse::prelude::*;
//! use object_warehouse::attributes::{AttribSubdomains, AttribSystem};
//!
//! struct Kernel { name: String, blocks: Vec<u16> }
//!
//! impl WarehouseObject for Kernel {
//!     fn name(&self) -> &str { &self.name }
//!     fn blocks(&self) -> Option<Vec<u16>> { Some(self.blocks.clone()) }
//! }
//!
//! let mut builder = WarehouseBuilder::new();
//! builder.register_attribute("system", AttribSystem::default())?;
//! builder.register_attribute("subdomains", AttribSubdomains::default())?;
//! let warehouse = builder.build();
//!
//! warehouse.add(Arc::new(Kernel { name: "diffusion".into(), blocks: vec![1, 2] }), "nl")?;
//! warehouse.add(Arc::new(Kernel { name: "source".into(), blocks: vec![2] }), "nl")?;
//!
//! let mut kernels: Vec<Arc<Kernel>> = Vec::new();
//! warehouse
//!     .query()
//!     .condition(AttribSystem::new("nl"))?
//!     .condition(AttribSubdomains::probe(1))?
//!     .query_into(&mut kernels)?;
//! assert_eq!(kernels.len(), 1);
//! assert_eq!(kernels[0].name, "diffusion");
//! # Ok::<(), object_warehouse::WarehouseError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(dead_code)]
#![allow(clippy::module_inception)]

pub mod engine;
pub mod attributes;
pub mod profiling;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::manager::{
    Warehouse,
    WarehouseBuilder,
    WarehouseStats,
};

pub use engine::query::Query;

pub use engine::attribute::{
    Attribute,
    BoundAttribute,
    ConditionKey,
    IndexTier,
    downcast_attribute,
};

pub use engine::registry::{AttributeDesc, AttributeRegistry};

pub use engine::object::{
    AsAny,
    WarehouseObject,
    BlockId,
    BoundaryId,
    TagName,
    ExecFlag,
    Interfaces,
};

pub use engine::config::WarehouseConfig;

pub use engine::error::{
    WarehouseResult,
    WarehouseError,
    RegistrationError,
    UsageError,
};

pub use engine::types::{
    KindId,
    ObjectId,
    QueryId,
    WarehouseId,
    KindSet,
    hash_of,
};

pub use profiling::profiler;

// ─────────────────────────────────────────────────────────────────────────────
// Prelude
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used warehouse types.
///
/// Import with:
/// ```rust
/// use object_warehouse::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Warehouse,
        WarehouseBuilder,
        WarehouseConfig,
        Query,
        Attribute,
        BoundAttribute,
        IndexTier,
        WarehouseObject,
        WarehouseError,
        WarehouseResult,
        downcast_attribute,
        hash_of,
    };
}
