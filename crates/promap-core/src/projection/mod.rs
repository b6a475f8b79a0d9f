//! Projection engine: convention-driven mapping synthesis and execution
//!
//! This module implements the core projection pipeline: destination fields
//! are resolved against the source type by naming convention (or explicit
//! per-field overrides), synthesized into a reusable mapping plan, memoized
//! per type pair, and executed against in-memory values.
//!
//! Copyright (c) 2025 Promap Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod executor;
pub mod expr;
pub mod plan;
pub mod planner;
pub mod resolver;


pub use cache::{CacheStats, CompiledMapping, MappingCache};
pub use executor::PlanExecutor;
pub use expr::{TypedExpr, ValueExpr};
pub use plan::{BindingOp, FieldBinding, MappingPlan};
pub use planner::{MappingPlanner, MAX_MAPPING_DEPTH};
pub use resolver::PathResolver;

use crate::error::Result;
use crate::registry::SchemaRegistry;
use serde_json::Value;
use std::sync::Arc;

/// The projection facade: a schema registry plus a compiled-mapping cache
///
/// A `Projector` is an explicit handle constructed once and shared by
/// reference; there is no module-level singleton. The registry is frozen at
/// construction, matching the cache's assumption that metadata never changes
/// for the life of the process.
///
/// # Example
///
/// ```
/// use promap_core::{Projector, SchemaRegistry, TypeSchema};
/// use serde_json::json;
///
/// # fn example() -> promap_core::Result<()> {
/// let mut registry = SchemaRegistry::new();
/// registry.register(
///     TypeSchema::builder("Customer")
///         .string("Name")
///         .build(),
/// )?;
/// registry.register(
///     TypeSchema::builder("CustomerView")
///         .string("Name")
///         .build(),
/// )?;
///
/// let projector = Projector::new(registry);
/// let view = projector.project("Customer", "CustomerView", &json!({"Name": "Ada"}))?;
/// assert_eq!(view, json!({"Name": "Ada"}));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct Projector {
    registry: SchemaRegistry,
    cache: MappingCache,
}

impl Projector {
    /// Create a projector over a frozen registry
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            cache: MappingCache::new(),
        }
    }

    /// The registry this projector resolves against
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The compiled mapping for a type pair, synthesized on first use
    ///
    /// This is the produced artifact boundary: adapters that translate plans
    /// into native query expressions start from [`CompiledMapping::plan`].
    pub fn mapping(
        &self,
        source_type: &str,
        dest_type: &str,
    ) -> Result<Arc<CompiledMapping>> {
        self.cache.get_or_build(&self.registry, source_type, dest_type)
    }

    /// Project one source value into a destination-typed value
    pub fn project(
        &self,
        source_type: &str,
        dest_type: &str,
        source: &Value,
    ) -> Result<Value> {
        self.mapping(source_type, dest_type)?.apply(source)
    }

    /// Bulk entry point: project a sequence of source values
    ///
    /// The cached mapping is looked up once and reused as the element
    /// transform.
    pub fn project_many(
        &self,
        source_type: &str,
        dest_type: &str,
        sources: impl IntoIterator<Item = Value>,
    ) -> Result<Vec<Value>> {
        let mapping = self.mapping(source_type, dest_type)?;
        sources
            .into_iter()
            .map(|source| mapping.apply(&source))
            .collect()
    }

    /// Cache counters for observability
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
