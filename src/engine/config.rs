//! Warehouse configuration.
//!
//! Tunables fixed when a warehouse is built. None of them change query
//! results; they only trade memory, recomputation and parallelism.

/// Default candidate count above which matching runs on the rayon pool.
pub const DEFAULT_PARALLEL_FILTER_THRESHOLD: usize = 4096;

/// Build-time settings for a [`Warehouse`](crate::Warehouse).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// Memoize the match set of every distinct condition list.
    ///
    /// When `false` every query recomputes its match set. Results are
    /// identical either way.
    pub cache_results: bool,

    /// Sort cache keys by kind id before lookup, so condition lists that
    /// differ only in the order of different kinds share one cache entry.
    ///
    /// Off by default: condition order is part of the cache key.
    pub canonicalize_conditions: bool,

    /// Candidate count above which `is_match` validation runs in parallel.
    pub parallel_filter_threshold: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            cache_results: true,
            canonicalize_conditions: false,
            parallel_filter_threshold: DEFAULT_PARALLEL_FILTER_THRESHOLD,
        }
    }
}

impl WarehouseConfig {
    /// Sets [`cache_results`](Self::cache_results).
    pub fn with_cache_results(mut self, enabled: bool) -> Self {
        self.cache_results = enabled;
        self
    }

    /// Sets [`canonicalize_conditions`](Self::canonicalize_conditions).
    pub fn with_canonical_conditions(mut self, enabled: bool) -> Self {
        self.canonicalize_conditions = enabled;
        self
    }

    /// Sets [`parallel_filter_threshold`](Self::parallel_filter_threshold).
    pub fn with_parallel_filter_threshold(mut self, threshold: usize) -> Self {
        self.parallel_filter_threshold = threshold;
        self
    }
}
