//! # Attribute Registry
//!
//! Per-warehouse table assigning stable [`KindId`] values to attribute kinds
//! and holding one prototype instance per kind.
//!
//! ## Design
//! - Kinds are registered by name and keyed by their Rust type; both maps
//!   resolve to the same dense id in `[0, KIND_CAP)`.
//! - The prototype acts as the factory: every inserted object receives a
//!   clone of it, which is then filled through `init_from`.
//! - The registry is mutable only inside a
//!   [`WarehouseBuilder`](crate::WarehouseBuilder). Building the warehouse
//!   seals it, so no kind can be registered after the first insertion.
//!
//! ## Invariants
//! - `by_name` and `by_type` agree: a name and a type map to the same id.
//! - `descs[id]` and `prototypes[id]` exist for every assigned id.
//! - Re-registering a name is idempotent and keeps the first prototype.

use std::any::{TypeId, type_name};

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::engine::attribute::{Attribute, BoundAttribute, IndexTier};
use crate::engine::error::{RegistrationError, UsageError, WarehouseResult};
use crate::engine::types::{KindId, WarehouseId, KIND_CAP};


/// Describes a registered attribute kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeDesc {
    /// Id assigned by the registry.
    pub kind_id: KindId,

    /// Registered name.
    pub name: String,

    /// Rust type name of the attribute.
    pub type_name: &'static str,

    /// Runtime `TypeId` of the attribute.
    pub type_id: TypeId,

    /// Index tier reported by the prototype.
    pub tier: IndexTier,
}

impl std::fmt::Display for AttributeDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AttributeDesc {{ id: {}, name: {}, type: {}, tier: {:?} }}",
            self.kind_id, self.name, self.type_name, self.tier
        )
    }
}

/// Mapping between attribute names, Rust types and kind ids for one warehouse.
pub struct AttributeRegistry {
    warehouse: WarehouseId,
    by_name: FxHashMap<String, KindId>,
    by_type: FxHashMap<TypeId, KindId>,
    descs: Vec<AttributeDesc>,
    prototypes: Vec<Box<dyn Attribute>>,
}

impl AttributeRegistry {
    pub(crate) fn new(warehouse: WarehouseId) -> Self {
        Self {
            warehouse,
            by_name: FxHashMap::default(),
            by_type: FxHashMap::default(),
            descs: Vec::new(),
            prototypes: Vec::new(),
        }
    }

    /// Registers attribute type `T` under `name` with the given prototype.
    ///
    /// ## Behavior
    /// - If `name` is already registered for `T`, returns the existing id and
    ///   drops `prototype`. A prototype that differs from the stored one is a
    ///   caller error: asserted in debug builds, logged otherwise.
    /// - Otherwise allocates the next id.
    ///
    /// ## Errors
    /// - `NameTypeConflict` if `name` belongs to another type.
    /// - `TypeNameConflict` if `T` is registered under another name.
    /// - `CapacityExceeded` past `KIND_CAP` kinds.

    pub(crate) fn register<T: Attribute>(&mut self, name: &str, prototype: T) -> Result<KindId, RegistrationError> {
        let type_id = TypeId::of::<T>();

        if let Some(&existing) = self.by_name.get(name) {
            let desc = &self.descs[existing as usize];
            if desc.type_id != type_id {
                return Err(RegistrationError::NameTypeConflict {
                    name: name.to_string(),
                    existing: desc.type_name,
                    requested: type_name::<T>(),
                });
            }
            let same_args = self.prototypes[existing as usize].is_equal(&prototype);
            if !same_args {
                warn!(attribute = name, "attribute re-registered with different construction arguments");
            }
            debug_assert!(same_args, "attribute '{name}' re-registered with different construction arguments");
            return Ok(existing);
        }

        if let Some(&other) = self.by_type.get(&type_id) {
            return Err(RegistrationError::TypeNameConflict {
                type_name: type_name::<T>(),
                existing: self.descs[other as usize].name.clone(),
                requested: name.to_string(),
            });
        }

        if self.descs.len() >= KIND_CAP {
            return Err(RegistrationError::CapacityExceeded);
        }

        let kind_id = self.descs.len() as KindId;
        let tier = prototype.index_tier();
        self.by_name.insert(name.to_string(), kind_id);
        self.by_type.insert(type_id, kind_id);
        self.descs.push(AttributeDesc {
            kind_id,
            name: name.to_string(),
            type_name: type_name::<T>(),
            type_id,
            tier,
        });
        self.prototypes.push(Box::new(prototype));

        debug!(attribute = name, kind_id, ?tier, "registered attribute kind");
        Ok(kind_id)
    }

    /// Warehouse this registry belongs to.
    #[inline]
    pub fn warehouse(&self) -> WarehouseId { self.warehouse }

    /// Number of registered kinds.
    #[inline]
    pub fn len(&self) -> usize { self.descs.len() }

    /// Returns `true` if no kind is registered.
    #[inline]
    pub fn is_empty(&self) -> bool { self.descs.is_empty() }

    /// Returns the id registered under `name`.
    pub fn id_of_name(&self, name: &str) -> Result<KindId, RegistrationError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| RegistrationError::NotRegistered { name: name.to_string() })
    }

    /// Returns the id registered for attribute type `T`.
    pub fn id_of<T: Attribute>(&self) -> Result<KindId, RegistrationError> {
        self.by_type
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(RegistrationError::TypeNotRegistered { type_name: type_name::<T>() })
    }

    /// Descriptor for `kind`, if registered.
    pub fn desc(&self, kind: KindId) -> Option<&AttributeDesc> {
        self.descs.get(kind as usize)
    }

    /// All descriptors in id order.
    pub fn descs(&self) -> &[AttributeDesc] { &self.descs }

    /// Index tier of `kind`. Unregistered kinds scan.
    #[inline]
    pub fn tier(&self, kind: KindId) -> IndexTier {
        self.descs.get(kind as usize).map_or(IndexTier::Scan, |d| d.tier)
    }

    /// Fresh copy of the prototype for `kind`, bound to this warehouse.
    pub fn instantiate(&self, kind: KindId) -> Option<BoundAttribute> {
        self.prototypes
            .get(kind as usize)
            .map(|p| BoundAttribute::new(kind, self.warehouse, p.clone_box()))
    }

    /// Binds `value` as an attribute of type `T`.
    pub fn bind<T: Attribute>(&self, value: T) -> Result<BoundAttribute, RegistrationError> {
        let kind = self.id_of::<T>()?;
        Ok(BoundAttribute::new(kind, self.warehouse, Box::new(value)))
    }

    /// Binds an already boxed attribute as kind `kind`.
    ///
    /// The dynamic type of `value` must be the type registered for `kind`.
    pub fn bind_kind(&self, kind: KindId, value: Box<dyn Attribute>) -> WarehouseResult<BoundAttribute> {
        let Some(desc) = self.desc(kind) else {
            return Err(UsageError::KindOutOfRange { kind, registered: self.len() }.into());
        };
        if value.as_any().type_id() != desc.type_id {
            return Err(UsageError::KindTypeMismatch { kind, expected: desc.type_name }.into());
        }
        Ok(BoundAttribute::new(kind, self.warehouse, value))
    }

    /// Checks that `attribute` was bound against this warehouse and a valid kind.
    pub fn check(&self, attribute: &BoundAttribute) -> Result<(), UsageError> {
        if attribute.warehouse() != self.warehouse {
            return Err(UsageError::ForeignAttribute {
                expected: self.warehouse,
                found: attribute.warehouse(),
            });
        }
        if attribute.kind() as usize >= self.len() {
            return Err(UsageError::KindOutOfRange {
                kind: attribute.kind(),
                registered: self.len(),
            });
        }
        Ok(())
    }
}
