//! Mapping plan: the synthesized projection AST
//!
//! A [`MappingPlan`] is the reusable description of how to construct one
//! destination-typed value from one source-typed value: a destination type
//! paired with per-field bindings. Binding operations form a closed variant
//! set so adapters can either interpret a plan directly (see
//! [`crate::projection::executor`]) or translate it into a native query
//! expression.
//!
//! Copyright (c) 2025 Promap Team
//! Licensed under the Apache-2.0 license

use crate::projection::expr::ValueExpr;
use crate::types::{ContainerKind, ScalarKind};
use std::fmt;

/// A synthesized mapping from a source type to a destination type
#[derive(Debug, Clone, PartialEq)]
pub struct MappingPlan {
    pub source_type: String,
    pub dest_type: String,
    /// Bindings in destination field order; excluded and unmappable fields
    /// are absent
    pub bindings: Vec<FieldBinding>,
}

/// One destination field paired with its value expression and binding operation
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    pub field: String,
    pub source: ValueExpr,
    pub op: BindingOp,
}

/// How a resolved source value is turned into the destination field value
#[derive(Debug, Clone, PartialEq)]
pub enum BindingOp {
    /// Direct scalar bind, with an implicit conversion when the resolved and
    /// declared scalar kinds differ
    Scalar { coerce: Option<ScalarKind> },
    /// Assignment-compatible object bind
    ObjectDirect,
    /// Nested object bind through a recursively synthesized plan; the plan
    /// is only evaluated when the source value is present (null-guarded)
    ObjectMapped { plan: Box<MappingPlan> },
    /// Collection bind without element remapping; `materialize` records a
    /// declared container kind the sequence must be coerced into, and
    /// `elem_coerce` an implicit per-element scalar conversion
    CollectionDirect {
        materialize: Option<ContainerKind>,
        elem_coerce: Option<ScalarKind>,
    },
    /// Collection bind whose elements are remapped through a recursively
    /// synthesized plan
    CollectionMapped {
        plan: Box<MappingPlan>,
        materialize: Option<ContainerKind>,
    },
}

impl MappingPlan {
    /// Binding for a destination field, if one was synthesized
    pub fn binding(&self, field: &str) -> Option<&FieldBinding> {
        self.bindings.iter().find(|b| b.field == field)
    }

    /// Whether a destination field was bound at all
    pub fn binds(&self, field: &str) -> bool {
        self.binding(field).is_some()
    }
}

impl fmt::Display for MappingPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} -> {} {{", self.source_type, self.dest_type)?;
        for binding in &self.bindings {
            writeln!(f, "    {} = {}", binding.field, binding.source)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_display() {
        let plan = MappingPlan {
            source_type: "Order".to_string(),
            dest_type: "OrderView".to_string(),
            bindings: vec![FieldBinding {
                field: "CustomerName".to_string(),
                source: ValueExpr::field(
                    ValueExpr::field(ValueExpr::Param, "Customer"),
                    "Name",
                ),
                op: BindingOp::Scalar { coerce: None },
            }],
        };
        let rendered = plan.to_string();
        assert!(rendered.starts_with("Order -> OrderView {"));
        assert!(rendered.contains("CustomerName = $.Customer.Name"));
    }
}
