//! Exact-tier kinds: matching is plain equality, so the index can bucket them.

use crate::engine::attribute::{Attribute, IndexTier};
use crate::engine::object::WarehouseObject;


/// System an object was added under (the `system` argument of `add`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttribSystem {
    system: String,
}

impl AttribSystem {
    /// Probe for objects added under `system`.
    pub fn new(system: impl Into<String>) -> Self { Self { system: system.into() } }

    /// The system name.
    pub fn system(&self) -> &str { &self.system }
}

impl Attribute for AttribSystem {
    value_attribute!(AttribSystem);

    fn init_from(&mut self, _object: &dyn WarehouseObject, system: &str) {
        self.system.clear();
        self.system.push_str(system);
    }

    fn is_match(&self, probe: &dyn Attribute) -> bool { self.is_equal(probe) }

    fn index_tier(&self) -> IndexTier { IndexTier::Exact }
}

/// Name of an object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttribName {
    name: String,
}

impl AttribName {
    /// Probe for objects named `name`.
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }

    /// The object name.
    pub fn name(&self) -> &str { &self.name }
}

impl Attribute for AttribName {
    value_attribute!(AttribName);

    fn init_from(&mut self, object: &dyn WarehouseObject, _system: &str) {
        self.name.clear();
        self.name.push_str(object.name());
    }

    fn is_match(&self, probe: &dyn Attribute) -> bool { self.is_equal(probe) }

    fn index_tier(&self) -> IndexTier { IndexTier::Exact }
}

/// Worker thread owning a copy of an object. Objects without one are on thread 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttribThread {
    thread: u32,
}

impl AttribThread {
    /// Probe for objects owned by `thread`.
    pub fn new(thread: u32) -> Self { Self { thread } }

    /// The thread id.
    pub fn thread(&self) -> u32 { self.thread }
}

impl Attribute for AttribThread {
    value_attribute!(AttribThread);

    fn init_from(&mut self, object: &dyn WarehouseObject, _system: &str) {
        self.thread = object.thread_id().unwrap_or(0);
    }

    fn is_match(&self, probe: &dyn Attribute) -> bool { self.is_equal(probe) }

    fn index_tier(&self) -> IndexTier { IndexTier::Exact }
}
