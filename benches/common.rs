#![allow(dead_code)]

use std::sync::Arc;

use object_warehouse::attributes::{AttribName, AttribSubdomains, AttribSystem, AttribTags, AttribThread};
use object_warehouse::{BlockId, TagName, Warehouse, WarehouseBuilder, WarehouseObject, WarehouseResult};

pub const OBJECTS_SMALL: usize = 1_000;
pub const OBJECTS_MED: usize = 10_000;
pub const OBJECTS_LARGE: usize = 100_000;

pub const BLOCKS: BlockId = 64;
pub const THREADS: u32 = 8;

pub struct Bench {
    pub name: String,
    pub blocks: Vec<BlockId>,
    pub thread: u32,
}

impl WarehouseObject for Bench {
    fn name(&self) -> &str { &self.name }
    fn blocks(&self) -> Option<Vec<BlockId>> { Some(self.blocks.clone()) }
    fn thread_id(&self) -> Option<u32> { Some(self.thread) }
    fn tags(&self) -> Option<Vec<TagName>> { Some(vec![format!("t{}", self.thread)]) }
}

pub fn make_warehouse() -> WarehouseResult<Warehouse> {
    let mut b = WarehouseBuilder::new();
    b.register_attribute("system", AttribSystem::default())?;
    b.register_attribute("name", AttribName::default())?;
    b.register_attribute("thread", AttribThread::default())?;
    b.register_attribute("subdomains", AttribSubdomains::default())?;
    b.register_attribute("tags", AttribTags::default())?;
    Ok(b.build())
}

pub fn make_objects(count: usize) -> Vec<Arc<Bench>> {
    (0..count)
        .map(|i| {
            Arc::new(Bench {
                name: format!("obj{i}"),
                blocks: vec![(i % BLOCKS as usize) as BlockId, ((i * 31) % BLOCKS as usize) as BlockId],
                thread: (i as u32) % THREADS,
            })
        })
        .collect()
}

pub fn populate(w: &Warehouse, objects: &[Arc<Bench>]) -> WarehouseResult<()> {
    for (i, o) in objects.iter().enumerate() {
        w.add(o.clone(), if i % 2 == 0 { "nl" } else { "aux" })?;
    }
    Ok(())
}
