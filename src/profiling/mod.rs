//! Chrome Trace (flame-style) profiler for warehouse operations.
//!
//! This module provides a **feature-gated, zero-overhead (when disabled)**
//! span API. When the `profiling` feature is enabled it records
//! `Warehouse::add`, `Warehouse::update` and `Warehouse::resolve` spans and
//! emits a **Chrome Trace Event JSON** file viewable in:
//!
//! - `chrome://tracing`
//! - <https://ui.perfetto.dev>
//!
//! ```no_run
//! use object_warehouse::profiler;
//!
//! profiler::init("profile/trace.json");
//! {
//!     let _g = profiler::span("setup");
//!     // register kinds, add objects
//! }
//! profiler::shutdown().expect("trace written");
//! ```
//!
//! When the feature is disabled every call compiles to a no-op.

pub mod profiler;
