//! In-memory plan execution
//!
//! Interprets a finalized [`MappingPlan`] over `serde_json::Value` data. This
//! is the reference adapter for synthesized plans; query-provider adapters
//! may instead walk a plan and translate it into a native store expression.
//!
//! Null safety is structural: field access on a missing or null base yields
//! null, and null-guarded object bindings never evaluate their nested plan
//! against an absent parent. Coercion failures, by contrast, are runtime
//! errors that belong to this layer.
//!
//! Copyright (c) 2025 Promap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::projection::expr::ValueExpr;
use crate::projection::plan::{BindingOp, MappingPlan};
use crate::types::ScalarKind;
use serde_json::{Map, Number, Value};
use std::borrow::Cow;

/// Executes mapping plans against in-memory values
pub struct PlanExecutor;

impl PlanExecutor {
    /// Apply `plan` to one source value, producing a freshly constructed
    /// destination object
    pub fn apply(plan: &MappingPlan, source: &Value) -> Result<Value> {
        let mut output = Map::with_capacity(plan.bindings.len());
        for binding in &plan.bindings {
            let resolved = eval(&binding.source, source);
            let value = apply_op(&binding.op, resolved.into_owned(), &binding.field)?;
            output.insert(binding.field.clone(), value);
        }
        Ok(Value::Object(output))
    }
}

/// Evaluate a value expression in the scope of `scope`
///
/// Borrows from the scope where possible; projections allocate.
fn eval<'v>(expr: &ValueExpr, scope: &'v Value) -> Cow<'v, Value> {
    match expr {
        ValueExpr::Param => Cow::Borrowed(scope),
        ValueExpr::Field { base, name } => match eval(base, scope) {
            Cow::Borrowed(value) => value
                .get(name)
                .map(Cow::Borrowed)
                .unwrap_or(Cow::Owned(Value::Null)),
            Cow::Owned(value) => {
                Cow::Owned(value.get(name).cloned().unwrap_or(Value::Null))
            }
        },
        ValueExpr::Project { source, body } => match eval(source, scope).as_ref() {
            Value::Array(items) => Cow::Owned(Value::Array(
                items
                    .iter()
                    .map(|item| eval(body, item).into_owned())
                    .collect(),
            )),
            // Projecting over an absent collection stays absent.
            _ => Cow::Owned(Value::Null),
        },
    }
}

fn apply_op(op: &BindingOp, value: Value, field: &str) -> Result<Value> {
    match op {
        BindingOp::Scalar { coerce: None } | BindingOp::ObjectDirect => Ok(value),
        BindingOp::Scalar { coerce: Some(kind) } => coerce_scalar(value, *kind, field),
        BindingOp::ObjectMapped { plan } => match value {
            Value::Null => Ok(Value::Null),
            present => PlanExecutor::apply(plan, &present),
        },
        BindingOp::CollectionDirect { elem_coerce, .. } => match (value, elem_coerce) {
            (Value::Null, _) => Ok(Value::Null),
            (sequence @ Value::Array(_), None) => Ok(sequence),
            (Value::Array(items), Some(kind)) => Ok(Value::Array(
                items
                    .into_iter()
                    .map(|item| coerce_scalar(item, *kind, field))
                    .collect::<Result<_>>()?,
            )),
            (other, _) => Err(shape_error(field, "a sequence", &other)),
        },
        BindingOp::CollectionMapped { plan, .. } => match value {
            Value::Null => Ok(Value::Null),
            Value::Array(items) => Ok(Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Null => Ok(Value::Null),
                        present => PlanExecutor::apply(plan, &present),
                    })
                    .collect::<Result<_>>()?,
            )),
            other => Err(shape_error(field, "a sequence", &other)),
        },
    }
}

/// Implicit scalar conversion between compatible kinds
///
/// Nulls pass through untouched; incompatible shapes are execution errors.
fn coerce_scalar(value: Value, kind: ScalarKind, field: &str) -> Result<Value> {
    match (kind, value) {
        (_, Value::Null) => Ok(Value::Null),
        (ScalarKind::String, Value::String(s)) => Ok(Value::String(s)),
        (ScalarKind::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (ScalarKind::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),
        (ScalarKind::Float, Value::Number(n)) => match n.as_f64().and_then(Number::from_f64) {
            Some(widened) => Ok(Value::Number(widened)),
            None => Err(Error::Execution {
                message: format!("number {} cannot widen to float", n),
                field: Some(field.to_string()),
            }),
        },
        (ScalarKind::Int, Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::Number(i.into()));
            }
            // Narrowing only when the float is integral.
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    Ok(Value::Number((f as i64).into()))
                }
                _ => Err(Error::Execution {
                    message: format!("number {} cannot convert to int", n),
                    field: Some(field.to_string()),
                }),
            }
        }
        (ScalarKind::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (kind, other) => Err(shape_error(field, &format!("a {} value", kind), &other)),
    }
}

fn shape_error(field: &str, expected: &str, got: &Value) -> Error {
    Error::Execution {
        message: format!("expected {}, got {}", expected, type_of(got)),
        field: Some(field.to_string()),
    }
}

fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
