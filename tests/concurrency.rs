// Run:
//   cargo test --test concurrency -- --nocapture

mod fixtures;

use std::sync::Arc;

use rayon::prelude::*;

use fixtures::*;

use object_warehouse::attributes::{AttribSubdomains, AttribSystem, AttribThread};
use object_warehouse::{WarehouseConfig, WarehouseResult};


const OBJECTS: u16 = 2_000;
const BLOCKS: u16 = 16;

#[test]
fn parallel_readers_agree_with_serial_results() -> WarehouseResult<()> {
    let w = warehouse()?;
    for i in 0..OBJECTS {
        let k = Kernel::on_thread(&format!("k{i}"), &[i % BLOCKS, (i * 7) % BLOCKS], u32::from(i % 4));
        w.add(k, if i % 3 == 0 { "aux" } else { "nl" })?;
    }

    let serial: Vec<usize> = (0..BLOCKS)
        .map(|b| w.query().condition(AttribSubdomains::probe(b))?.count())
        .collect::<WarehouseResult<_>>()?;

    let parallel: Vec<Vec<usize>> = (0..8)
        .into_par_iter()
        .map(|_| {
            (0..BLOCKS)
                .map(|b| w.query().condition(AttribSubdomains::probe(b))?.count())
                .collect::<WarehouseResult<Vec<_>>>()
        })
        .collect::<WarehouseResult<_>>()?;

    for run in parallel {
        assert_eq!(run, serial);
    }
    assert_eq!(w.cached_query_count(), BLOCKS as usize);
    Ok(())
}

#[test]
fn per_thread_queries_from_the_pool() -> WarehouseResult<()> {
    let w = warehouse()?;
    let mut all = Vec::new();
    for i in 0..400u16 {
        let k = Kernel::on_thread(&format!("k{i}"), &[i % 5], u32::from(i % 4));
        w.add(k.clone(), "nl")?;
        all.push(k);
    }

    let base = w.query().condition(AttribSystem::new("nl"))?;
    let per_thread: Vec<Vec<Arc<Kernel>>> = (0..4u32)
        .into_par_iter()
        .map(|tid| -> WarehouseResult<Vec<Arc<Kernel>>> {
            let mut out = Vec::new();
            base.clone().condition(AttribThread::new(tid))?.query_into(&mut out)?;
            Ok(out)
        })
        .collect::<WarehouseResult<_>>()?;

    for (tid, kernels) in per_thread.iter().enumerate() {
        assert_eq!(kernels.len(), 100);
        assert!(kernels.iter().all(|k| k.thread as usize == tid));
    }
    Ok(())
}

#[test]
fn parallel_filtering_matches_serial_filtering() -> WarehouseResult<()> {
    let serial = warehouse_with(WarehouseConfig::default().with_parallel_filter_threshold(usize::MAX))?;
    let parallel = warehouse_with(WarehouseConfig::default().with_parallel_filter_threshold(0))?;
    for i in 0..500u16 {
        serial.add(Kernel::new(&format!("k{i}"), &[i % 9]), "nl")?;
        parallel.add(Kernel::new(&format!("k{i}"), &[i % 9]), "nl")?;
    }

    let (mut a, mut b): (Vec<Arc<Kernel>>, Vec<Arc<Kernel>>) = (Vec::new(), Vec::new());
    for block in 0..9 {
        serial.query().condition(AttribSubdomains::probe(block))?.query_into(&mut a)?;
        parallel.query().condition(AttribSubdomains::probe(block))?.query_into(&mut b)?;
        assert_eq!(names(&a), names(&b));
    }
    Ok(())
}

#[test]
fn disabling_from_another_thread_is_seen_without_update() -> WarehouseResult<()> {
    let w = warehouse()?;
    let kernels: Vec<Arc<Kernel>> = (0..64u16).map(|i| Kernel::new(&format!("k{i}"), &[1])).collect();
    for k in &kernels {
        w.add(k.clone(), "nl")?;
    }
    let query = w.query().condition(AttribSubdomains::probe(1))?;
    assert_eq!(query.count()?, 64);

    kernels.par_iter().step_by(2).for_each(|k| k.set_enabled(false));
    assert_eq!(query.count()?, 32);
    assert_eq!(w.stats().cache_misses, 1);
    Ok(())
}
