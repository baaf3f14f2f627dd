//! Pair region cache
//!
//! Order-insensitive memoization of built pair regions. Requesting
//! `(a, b)` and `(b, a)` yields the same `Arc`, so callers can use pointer
//! identity to detect reuse and never build a pair twice.

use crate::features::pair_checking::domain::{EntryPointPair, PairCheckingRegion};
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct PairRegionCache {
    regions: FxHashMap<EntryPointPair, Arc<PairCheckingRegion>>,
}

impl PairRegionCache {
    pub fn new() -> Self {
        Self {
            regions: FxHashMap::default(),
        }
    }

    pub fn get(&self, first: &str, second: &str) -> Option<Arc<PairCheckingRegion>> {
        self.regions
            .get(&EntryPointPair::new(first, second))
            .map(Arc::clone)
    }

    /// Returns the cached region for the pair, building it at most once.
    /// `None` when the builder declines the pair.
    pub fn get_or_build<F>(
        &mut self,
        first: &str,
        second: &str,
        build: F,
    ) -> Option<Arc<PairCheckingRegion>>
    where
        F: FnOnce(&EntryPointPair) -> Option<PairCheckingRegion>,
    {
        let pair = EntryPointPair::new(first, second);
        if let Some(region) = self.regions.get(&pair) {
            return Some(Arc::clone(region));
        }
        let region = Arc::new(build(&pair)?);
        self.regions.insert(pair, Arc::clone(&region));
        Some(region)
    }

    pub fn regions(&self) -> impl Iterator<Item = &Arc<PairCheckingRegion>> {
        self.regions.values()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }
}
