//! Mapping synthesis: building projection plans from field metadata
//!
//! The planner walks a destination type's fields, resolves each one against
//! the source type through the path resolver, classifies the resolved shape
//! (scalar, object, collection) and emits the matching binding, recursing
//! into nested plans for object and collection-of-object fields.
//!
//! Path-resolution failures are fatal to the whole build, at every recursion
//! depth: they indicate a convention mismatch partial mapping cannot paper
//! over. Depth overflow is not: a recursive build past the fixed bound makes
//! only that field unmappable, and it is omitted from its binding set.
//!
//! Copyright (c) 2025 Promap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::projection::expr::{TypedExpr, ValueExpr};
use crate::projection::plan::{BindingOp, FieldBinding, MappingPlan};
use crate::projection::resolver::PathResolver;
use crate::registry::SchemaRegistry;
use crate::types::{ContainerKind, FieldDescriptor, FieldType, ScalarKind};
use tracing::debug;

/// Maximum nesting depth for recursive plan synthesis
///
/// Protects self-referencing and mutually-referencing type graphs from
/// unbounded recursion; fields past the bound are omitted, not errors.
pub const MAX_MAPPING_DEPTH: usize = 8;

/// Synthesizes mapping plans over a schema registry
pub struct MappingPlanner<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> MappingPlanner<'a> {
    /// Create a planner over the given registry
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Build the mapping plan for a (source type, destination type) pair
    ///
    /// Synthesis is deterministic: repeated calls for the same pair produce
    /// value-equal plans as long as the registry is unchanged.
    pub fn build(&self, source_type: &str, dest_type: &str) -> Result<MappingPlan> {
        match self.build_at(source_type, dest_type, 0)? {
            Some(plan) => Ok(plan),
            // Cannot happen with a positive depth bound.
            None => Err(Error::Schema {
                message: format!(
                    "mapping {} -> {} rejected by the depth guard at depth zero",
                    source_type, dest_type
                ),
                source: None,
            }),
        }
    }

    /// Recursive build step; `None` means "too deep to map"
    fn build_at(
        &self,
        source_type: &str,
        dest_type: &str,
        depth: usize,
    ) -> Result<Option<MappingPlan>> {
        if depth > MAX_MAPPING_DEPTH {
            debug!(source_type, dest_type, depth, "depth bound exceeded, omitting");
            return Ok(None);
        }
        let source = self.registry.require(source_type)?;
        let dest = self.registry.require(dest_type)?;
        let resolver = PathResolver::new(self.registry);

        let mut bindings = Vec::new();
        for field in dest.fields.iter().filter(|f| !f.excluded) {
            let path = field.source_path.as_deref().unwrap_or(&field.name);
            let resolved = resolver.resolve(ValueExpr::Param, path, source)?;
            if let Some(binding) = self.bind_field(field, resolved, depth)? {
                bindings.push(binding);
            }
        }

        debug!(
            source_type,
            dest_type,
            depth,
            bindings = bindings.len(),
            "synthesized mapping plan"
        );
        Ok(Some(MappingPlan {
            source_type: source.name.clone(),
            dest_type: dest.name.clone(),
            bindings,
        }))
    }

    /// Classify a resolved expression's shape and emit the matching binding;
    /// `None` omits the field (depth-limited or shape-incompatible)
    fn bind_field(
        &self,
        field: &FieldDescriptor,
        resolved: TypedExpr,
        depth: usize,
    ) -> Result<Option<FieldBinding>> {
        let op = match &resolved.ty {
            FieldType::Collection { container, element } => {
                self.bind_collection(field, *container, element, depth)?
            }
            FieldType::Object(resolved_type) => {
                self.bind_object(field, resolved_type, depth)?
            }
            FieldType::Scalar(resolved_kind) => Some(bind_scalar(field, *resolved_kind)),
        };
        Ok(op.map(|op| FieldBinding {
            field: field.name.clone(),
            source: resolved.expr,
            op,
        }))
    }

    /// Collection binding: reconcile element types and the outer container
    fn bind_collection(
        &self,
        field: &FieldDescriptor,
        resolved_kind: ContainerKind,
        resolved_element: &FieldType,
        depth: usize,
    ) -> Result<Option<BindingOp>> {
        let FieldType::Collection {
            container: declared_kind,
            element: declared_element,
        } = &field.ty
        else {
            // A sequence cannot fill a non-collection destination field.
            return Ok(None);
        };

        let materialize = (resolved_kind != *declared_kind).then_some(*declared_kind);
        if resolved_element == declared_element.as_ref() {
            return Ok(Some(BindingOp::CollectionDirect {
                materialize,
                elem_coerce: None,
            }));
        }
        match (resolved_element, declared_element.as_ref()) {
            (FieldType::Object(source_elem), FieldType::Object(dest_elem)) => {
                Ok(self.build_at(source_elem, dest_elem, depth + 1)?.map(|plan| {
                    BindingOp::CollectionMapped {
                        plan: Box::new(plan),
                        materialize,
                    }
                }))
            }
            (FieldType::Scalar(_), FieldType::Scalar(dest_kind)) => {
                Ok(Some(BindingOp::CollectionDirect {
                    materialize,
                    elem_coerce: Some(*dest_kind),
                }))
            }
            _ => Ok(None),
        }
    }

    /// Object binding: direct when assignment-compatible, otherwise a
    /// null-guarded recursive plan
    fn bind_object(
        &self,
        field: &FieldDescriptor,
        resolved_type: &str,
        depth: usize,
    ) -> Result<Option<BindingOp>> {
        match &field.ty {
            FieldType::Object(declared) if declared == resolved_type => {
                Ok(Some(BindingOp::ObjectDirect))
            }
            FieldType::Object(declared) => {
                Ok(self.build_at(resolved_type, declared, depth + 1)?.map(|plan| {
                    BindingOp::ObjectMapped {
                        plan: Box::new(plan),
                    }
                }))
            }
            _ => Ok(None),
        }
    }
}

/// Scalar binding: coerce only when the resolved and declared kinds differ
fn bind_scalar(field: &FieldDescriptor, resolved_kind: ScalarKind) -> BindingOp {
    let coerce = match &field.ty {
        FieldType::Scalar(declared) if *declared != resolved_kind => Some(*declared),
        _ => None,
    };
    BindingOp::Scalar { coerce }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeSchema;
    use pretty_assertions::assert_eq;

    fn create_test_registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                TypeSchema::builder("Order")
                    .int("Id")
                    .object("Customer", "Customer")
                    .list_of("Items", FieldType::Object("Item".to_string()))
                    .build(),
            )
            .unwrap();
        registry
            .register(TypeSchema::builder("Customer").string("Name").build())
            .unwrap();
        registry
            .register(
                TypeSchema::builder("Item")
                    .string("Name")
                    .float("Price")
                    .build(),
            )
            .unwrap();
        registry
            .register(
                TypeSchema::builder("OrderView")
                    .float("Id")
                    .string("CustomerName")
                    .list_of("ItemsName", FieldType::Scalar(ScalarKind::String))
                    .build(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_build_is_deterministic() {
        let registry = create_test_registry();
        let planner = MappingPlanner::new(&registry);
        let first = planner.build("Order", "OrderView").unwrap();
        let second = planner.build("Order", "OrderView").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scalar_binding_with_widening_coercion() {
        let registry = create_test_registry();
        let planner = MappingPlanner::new(&registry);
        let plan = planner.build("Order", "OrderView").unwrap();

        let id = plan.binding("Id").unwrap();
        assert_eq!(
            id.op,
            BindingOp::Scalar {
                coerce: Some(ScalarKind::Float)
            }
        );
    }

    #[test]
    fn test_flattened_scalar_binding_has_no_coercion() {
        let registry = create_test_registry();
        let planner = MappingPlanner::new(&registry);
        let plan = planner.build("Order", "OrderView").unwrap();

        let name = plan.binding("CustomerName").unwrap();
        assert_eq!(name.source.to_string(), "$.Customer.Name");
        assert_eq!(name.op, BindingOp::Scalar { coerce: None });
    }

    #[test]
    fn test_collection_flattening_binds_direct() {
        let registry = create_test_registry();
        let planner = MappingPlanner::new(&registry);
        let plan = planner.build("Order", "OrderView").unwrap();

        let items = plan.binding("ItemsName").unwrap();
        assert_eq!(items.source.to_string(), "$.Items.map($.Name)");
        assert_eq!(
            items.op,
            BindingOp::CollectionDirect {
                materialize: None,
                elem_coerce: None
            }
        );
    }

    #[test]
    fn test_collection_element_remapping() {
        let mut registry = create_test_registry();
        registry
            .register(
                TypeSchema::builder("ItemView")
                    .string("Name")
                    .float("Price")
                    .build(),
            )
            .unwrap();
        registry
            .register(
                TypeSchema::builder("Summary")
                    .array_of("Items", FieldType::Object("ItemView".to_string()))
                    .build(),
            )
            .unwrap();
        let planner = MappingPlanner::new(&registry);
        let plan = planner.build("Order", "Summary").unwrap();

        let items = plan.binding("Items").unwrap();
        match &items.op {
            BindingOp::CollectionMapped { plan, materialize } => {
                assert_eq!(plan.source_type, "Item");
                assert_eq!(plan.dest_type, "ItemView");
                assert_eq!(*materialize, Some(ContainerKind::Array));
            }
            other => panic!("expected CollectionMapped, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_object_is_null_guarded_plan() {
        let mut registry = create_test_registry();
        registry
            .register(TypeSchema::builder("CustomerView").string("Name").build())
            .unwrap();
        registry
            .register(
                TypeSchema::builder("Wrapper")
                    .object("Customer", "CustomerView")
                    .build(),
            )
            .unwrap();
        let planner = MappingPlanner::new(&registry);
        let plan = planner.build("Order", "Wrapper").unwrap();

        let customer = plan.binding("Customer").unwrap();
        assert!(matches!(customer.op, BindingOp::ObjectMapped { .. }));
    }

    #[test]
    fn test_identical_object_type_binds_direct() {
        let mut registry = create_test_registry();
        registry
            .register(
                TypeSchema::builder("Passthrough")
                    .object("Customer", "Customer")
                    .build(),
            )
            .unwrap();
        let planner = MappingPlanner::new(&registry);
        let plan = planner.build("Order", "Passthrough").unwrap();

        assert_eq!(
            plan.binding("Customer").unwrap().op,
            BindingOp::ObjectDirect
        );
    }

    #[test]
    fn test_excluded_fields_are_not_bound() {
        let mut registry = create_test_registry();
        registry
            .register(
                TypeSchema::builder("Redacted")
                    .string("CustomerName")
                    .int("Id")
                    .exclude()
                    .build(),
            )
            .unwrap();
        let planner = MappingPlanner::new(&registry);
        let plan = planner.build("Order", "Redacted").unwrap();

        assert!(plan.binds("CustomerName"));
        assert!(!plan.binds("Id"));
    }

    #[test]
    fn test_override_path_replaces_convention() {
        let mut registry = create_test_registry();
        registry
            .register(
                TypeSchema::builder("Labeled")
                    .string("Label")
                    .mapped_from("CustomerName")
                    .build(),
            )
            .unwrap();
        let planner = MappingPlanner::new(&registry);
        let plan = planner.build("Order", "Labeled").unwrap();

        let label = plan.binding("Label").unwrap();
        assert_eq!(label.source.to_string(), "$.Customer.Name");
    }

    #[test]
    fn test_unresolved_path_aborts_whole_build() {
        let mut registry = create_test_registry();
        registry
            .register(
                TypeSchema::builder("Broken")
                    .string("CustomerName")
                    .string("Nonexistent")
                    .build(),
            )
            .unwrap();
        let planner = MappingPlanner::new(&registry);

        let err = planner.build("Order", "Broken").unwrap_err();
        assert!(matches!(err, Error::UnresolvedPath { .. }));
    }

    #[test]
    fn test_nested_unresolved_path_aborts_whole_build() {
        // The convention error sits inside a recursively synthesized element
        // plan; it must still abort the top-level build.
        let mut registry = create_test_registry();
        registry
            .register(TypeSchema::builder("BadItemView").string("Missing").build())
            .unwrap();
        registry
            .register(
                TypeSchema::builder("BadSummary")
                    .list_of("Items", FieldType::Object("BadItemView".to_string()))
                    .build(),
            )
            .unwrap();
        let planner = MappingPlanner::new(&registry);

        let err = planner.build("Order", "BadSummary").unwrap_err();
        assert!(matches!(err, Error::UnresolvedPath { .. }));
    }

    #[test]
    fn test_depth_guard_omits_deep_field_keeps_shallow() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                TypeSchema::builder("Node")
                    .string("Label")
                    .object("Next", "Node")
                    .build(),
            )
            .unwrap();
        registry
            .register(
                TypeSchema::builder("NodeView")
                    .string("Label")
                    .object("Next", "NodeView")
                    .build(),
            )
            .unwrap();
        let planner = MappingPlanner::new(&registry);
        let plan = planner.build("Node", "NodeView").unwrap();

        assert!(plan.binds("Label"));
        assert!(plan.binds("Next"));

        // Walk to the deepest synthesized plan: the self-referencing field
        // disappears there while the scalar stays mapped.
        let mut current = &plan;
        let mut levels = 0;
        while let Some(binding) = current.binding("Next") {
            match &binding.op {
                BindingOp::ObjectMapped { plan } => {
                    current = plan;
                    levels += 1;
                }
                other => panic!("expected ObjectMapped, got {:?}", other),
            }
        }
        assert_eq!(levels, MAX_MAPPING_DEPTH);
        assert!(current.binds("Label"));
        assert!(!current.binds("Next"));
    }

    #[test]
    fn test_empty_binding_set_is_valid() {
        let mut registry = create_test_registry();
        registry
            .register(TypeSchema::builder("Empty").build())
            .unwrap();
        let planner = MappingPlanner::new(&registry);
        let plan = planner.build("Order", "Empty").unwrap();
        assert!(plan.bindings.is_empty());
    }

    #[test]
    fn test_unknown_dest_type_fails() {
        let registry = create_test_registry();
        let planner = MappingPlanner::new(&registry);
        let err = planner.build("Order", "Ghost").unwrap_err();
        assert!(matches!(err, Error::UnknownType { name } if name == "Ghost"));
    }
}
