//! # Built-in attribute kinds
//!
//! Standard metadata tracked for simulation objects. None of them is
//! registered automatically; register the ones a warehouse needs:
//!
//! ```
//! use object_warehouse::WarehouseBuilder;
//! use object_warehouse::attributes::*;
//!
//! let mut b = WarehouseBuilder::new();
//! b.register_attribute("system", AttribSystem::default())?;
//! b.register_attribute("name", AttribName::default())?;
//! b.register_attribute("thread", AttribThread::default())?;
//! b.register_attribute("subdomains", AttribSubdomains::default())?;
//! b.register_attribute("boundaries", AttribBoundaries::default())?;
//! b.register_attribute("tags", AttribTags::default())?;
//! b.register_attribute("execute_on", AttribExecOn::default())?;
//! b.register_attribute("interfaces", AttribInterfaces::default())?;
//! let warehouse = b.build();
//! assert_eq!(warehouse.attribute_count(), 8);
//! # Ok::<(), object_warehouse::WarehouseError>(())
//! ```
//!
//! | Kind | Stored | Probe | Match | Tier |
//! |------|--------|-------|-------|------|
//! | [`AttribSystem`] | system name given to `add` | a name | equal | exact |
//! | [`AttribName`] | object name | a name | equal | exact |
//! | [`AttribThread`] | owning thread id | a thread id | equal | exact |
//! | [`AttribSubdomains`] | block ids | one block id | contained, with wildcards | scan |
//! | [`AttribBoundaries`] | boundary ids | one boundary id | contained, with wildcards | scan |
//! | [`AttribTags`] | tag names | tag names | any shared tag | scan |
//! | [`AttribExecOn`] | execution flags | one flag | contained, or `Always` stored | scan |
//! | [`AttribInterfaces`] | interface bits | interface bits | any shared bit | scan |

use crate::engine::object::{BlockId, BoundaryId};

/// Implements the value-like part of [`Attribute`](crate::Attribute) for a
/// type deriving `Clone`, `PartialEq` and `Hash`.
macro_rules! value_attribute {
    ($ty:ty) => {
        fn hash_value(&self) -> u64 { $crate::engine::types::hash_of(self) }

        fn is_equal(&self, other: &dyn $crate::Attribute) -> bool {
            $crate::engine::attribute::downcast_attribute::<$ty>(other).is_some_and(|o| o == self)
        }

        fn clone_box(&self) -> Box<dyn $crate::Attribute> { Box::new(self.clone()) }

        fn as_any(&self) -> &dyn std::any::Any { self }
    };
}

mod exact;
mod restriction;
mod flags;

pub use exact::{AttribName, AttribSystem, AttribThread};
pub use restriction::{AttribBoundaries, AttribSubdomains};
pub use flags::{AttribExecOn, AttribInterfaces, AttribTags};

/// Block id matching every block, as a probe or as a stored restriction.
pub const ANY_BLOCK_ID: BlockId = BlockId::MAX - 1;

/// Block id that never matches.
pub const INVALID_BLOCK_ID: BlockId = BlockId::MAX;

/// Boundary id matching every boundary, as a probe or as a stored restriction.
pub const ANY_BOUNDARY_ID: BoundaryId = -1;

/// Boundary id that never matches.
pub const INVALID_BOUNDARY_ID: BoundaryId = -123;
