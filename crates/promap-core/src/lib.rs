//! Promap Core - convention-driven projection mapping engine
//!
//! This crate synthesizes pure transformations between typed shapes: given
//! field metadata for a source type and a destination type, it builds a
//! reusable mapping plan that copies and reshapes data field by field,
//! following naming conventions instead of hand-written per-field code.
//!
//! # Main Components
//!
//! - **Error Handling**: Error types using `thiserror` with an ergonomic
//!   `Result` alias
//! - **Schema Model**: Field descriptors, type schemas and the registry that
//!   serves as the field-metadata provider
//! - **Path Resolution**: Convention paths resolved into typed value
//!   expressions, with flattening and collection projection
//! - **Mapping Synthesis**: Recursive plan construction with null guards,
//!   element remapping and a fixed depth bound
//! - **Execution & Caching**: An in-memory plan interpreter and a
//!   process-lifetime compiled-mapping cache behind the [`Projector`] facade
//!
//! # Example
//!
//! ```
//! use promap_core::{Projector, Result, SchemaRegistry, TypeSchema};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let mut registry = SchemaRegistry::new();
//!     registry.register(
//!         TypeSchema::builder("Customer")
//!             .string("Name")
//!             .object("Address", "Address")
//!             .build(),
//!     )?;
//!     registry.register(TypeSchema::builder("Address").string("City").build())?;
//!     registry.register(
//!         TypeSchema::builder("CustomerView")
//!             .string("Name")
//!             .string("AddressCity")
//!             .build(),
//!     )?;
//!
//!     let projector = Projector::new(registry);
//!     let view = projector.project(
//!         "Customer",
//!         "CustomerView",
//!         &json!({"Name": "Ada", "Address": {"City": "London"}}),
//!     )?;
//!     assert_eq!(view, json!({"Name": "Ada", "AddressCity": "London"}));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod error;
pub mod projection;
pub mod registry;
pub mod types;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use projection::{
    // Facade
    Projector,

    // Mapping AST
    BindingOp, FieldBinding, MappingPlan,

    // Synthesis
    MappingPlanner, PathResolver, MAX_MAPPING_DEPTH,

    // Value expressions
    TypedExpr, ValueExpr,

    // Execution and caching
    CacheStats, CompiledMapping, MappingCache, PlanExecutor,
};
pub use registry::{SchemaDocument, SchemaRegistry};
pub use types::{
    ContainerKind, FieldDescriptor, FieldType, ScalarKind, TypeSchema, TypeSchemaBuilder,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
