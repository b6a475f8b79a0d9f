//! Compiled mapping cache
//!
//! One synthesized mapping per (source type, destination type) pair, built
//! lazily on first use and reused for the life of the process. There is no
//! invalidation path: schemas are assumed static once registered. A first-use
//! race between callers is tolerated; synthesis is deterministic, so the
//! duplicate build loses the insert and only wastes work.
//!
//! Copyright (c) 2025 Promap Team
//! Licensed under the Apache-2.0 license

use crate::error::Result;
use crate::projection::executor::PlanExecutor;
use crate::projection::plan::MappingPlan;
use crate::projection::planner::MappingPlanner;
use crate::registry::SchemaRegistry;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// A finalized, executable mapping for one type pair
#[derive(Debug)]
pub struct CompiledMapping {
    plan: MappingPlan,
}

impl CompiledMapping {
    /// The underlying plan, for adapters that translate rather than execute
    pub fn plan(&self) -> &MappingPlan {
        &self.plan
    }

    /// Execute the mapping against one source value
    pub fn apply(&self, source: &Value) -> Result<Value> {
        PlanExecutor::apply(&self.plan, source)
    }
}

/// Counters exposed for observability and cache-identity tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Process-lifetime memo of compiled mappings, keyed by type-pair
#[derive(Debug, Default)]
pub struct MappingCache {
    entries: RwLock<HashMap<(String, String), Arc<CompiledMapping>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MappingCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled mapping for a type pair, synthesizing it on first
    /// use
    ///
    /// Synthesis happens outside the write lock; when two callers race on
    /// the same cold pair, the first insert wins and the other build is
    /// discarded (the results are value-equal anyway).
    pub fn get_or_build(
        &self,
        registry: &SchemaRegistry,
        source_type: &str,
        dest_type: &str,
    ) -> Result<Arc<CompiledMapping>> {
        let key = (source_type.to_string(), dest_type.to_string());
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = entries.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(found));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(source_type, dest_type, "cache miss, synthesizing mapping");
        let plan = MappingPlanner::new(registry).build(source_type, dest_type)?;
        let compiled = Arc::new(CompiledMapping { plan });

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(compiled)))
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
        }
    }
}
