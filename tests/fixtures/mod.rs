#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use object_warehouse::attributes::*;
use object_warehouse::{
    BlockId, ExecFlag, Interfaces, TagName, Warehouse, WarehouseBuilder, WarehouseConfig,
    WarehouseObject, WarehouseResult,
};


/// Simulation object with mutable restriction state and a live enabled flag.
pub struct Kernel {
    pub name: String,
    enabled: AtomicBool,
    blocks: RwLock<Vec<BlockId>>,
    tags: RwLock<Vec<TagName>>,
    pub execute_on: Vec<ExecFlag>,
    pub thread: u32,
}

impl Kernel {
    pub fn new(name: &str, blocks: &[BlockId]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            enabled: AtomicBool::new(true),
            blocks: RwLock::new(blocks.to_vec()),
            tags: RwLock::new(Vec::new()),
            execute_on: vec![ExecFlag::Linear],
            thread: 0,
        })
    }

    pub fn on_thread(name: &str, blocks: &[BlockId], thread: u32) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            enabled: AtomicBool::new(true),
            blocks: RwLock::new(blocks.to_vec()),
            tags: RwLock::new(Vec::new()),
            execute_on: vec![ExecFlag::Linear],
            thread,
        })
    }

    pub fn set_enabled(&self, on: bool) { self.enabled.store(on, Ordering::Relaxed); }

    pub fn set_blocks(&self, blocks: &[BlockId]) { *self.blocks.write() = blocks.to_vec(); }

    pub fn set_tags(&self, tags: &[&str]) {
        *self.tags.write() = tags.iter().map(|t| t.to_string()).collect();
    }
}

impl WarehouseObject for Kernel {
    fn name(&self) -> &str { &self.name }
    fn enabled(&self) -> bool { self.enabled.load(Ordering::Relaxed) }
    fn blocks(&self) -> Option<Vec<BlockId>> { Some(self.blocks.read().clone()) }
    fn tags(&self) -> Option<Vec<TagName>> { Some(self.tags.read().clone()) }
    fn execute_on(&self) -> Option<Vec<ExecFlag>> { Some(self.execute_on.clone()) }
    fn thread_id(&self) -> Option<u32> { Some(self.thread) }
    fn interfaces(&self) -> Interfaces { Interfaces::ELEMENT | Interfaces::BLOCK_RESTRICTABLE }
}

/// A second object type, used to provoke failed downcasts.
pub struct Postprocessor {
    pub name: String,
}

impl Postprocessor {
    pub fn new(name: &str) -> Arc<Self> { Arc::new(Self { name: name.to_string() }) }
}

impl WarehouseObject for Postprocessor {
    fn name(&self) -> &str { &self.name }
    fn execute_on(&self) -> Option<Vec<ExecFlag>> { Some(vec![ExecFlag::TimestepEnd]) }
    fn interfaces(&self) -> Interfaces { Interfaces::POSTPROCESSOR | Interfaces::GENERAL }
}

/// Warehouse with every built-in kind registered.
pub fn warehouse() -> WarehouseResult<Warehouse> {
    warehouse_with(WarehouseConfig::default())
}

pub fn warehouse_with(config: WarehouseConfig) -> WarehouseResult<Warehouse> {
    let mut b = WarehouseBuilder::new().with_config(config);
    b.register_attribute("system", AttribSystem::default())?;
    b.register_attribute("name", AttribName::default())?;
    b.register_attribute("thread", AttribThread::default())?;
    b.register_attribute("subdomains", AttribSubdomains::default())?;
    b.register_attribute("boundaries", AttribBoundaries::default())?;
    b.register_attribute("tags", AttribTags::default())?;
    b.register_attribute("execute_on", AttribExecOn::default())?;
    b.register_attribute("interfaces", AttribInterfaces::default())?;
    Ok(b.build())
}

/// Names of `objects`, in order.
pub fn names<T: WarehouseObject>(objects: &[Arc<T>]) -> Vec<String> {
    objects.iter().map(|o| o.name().to_string()).collect()
}
