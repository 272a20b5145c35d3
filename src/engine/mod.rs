//! # Engine Module
//!
//! Core warehouse implementation.
//!
//! This module contains the building blocks of a warehouse:
//! - Attribute trait, bound attributes and cache keys
//! - Attribute registry
//! - Object contract and object store
//! - Exact-tier index
//! - Queries and the warehouse orchestrator
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod types;
pub mod error;
pub mod config;
pub mod object;
pub mod attribute;
pub mod registry;
pub mod index;
pub mod storage;
pub mod query;
pub mod manager;
