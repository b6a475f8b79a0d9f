//! Value-expression AST produced by path resolution
//!
//! A [`ValueExpr`] describes how to reach a value from a bound source
//! parameter: chained field accesses, optionally wrapped in element-wise
//! projections over collections. Expressions are transient synthesis output;
//! they live inside the mapping plan that owns them.
//!
//! Copyright (c) 2025 Promap Team
//! Licensed under the Apache-2.0 license

use crate::types::FieldType;
use std::fmt;

/// A pure expression over a single bound source parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    /// The bound source parameter for the current scope
    Param,
    /// Member access on a base expression
    Field {
        base: Box<ValueExpr>,
        name: String,
    },
    /// Element-wise projection over a sequence; `body` is evaluated with
    /// each element bound as the parameter of its own scope
    Project {
        source: Box<ValueExpr>,
        body: Box<ValueExpr>,
    },
}

impl ValueExpr {
    /// Member access on `base`
    pub fn field(base: ValueExpr, name: impl Into<String>) -> Self {
        ValueExpr::Field {
            base: Box::new(base),
            name: name.into(),
        }
    }

    /// Element-wise projection of `body` over `source`
    pub fn project(source: ValueExpr, body: ValueExpr) -> Self {
        ValueExpr::Project {
            source: Box::new(source),
            body: Box::new(body),
        }
    }
}

/// A resolved expression paired with its static type
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub expr: ValueExpr,
    pub ty: FieldType,
}

impl TypedExpr {
    pub fn new(expr: ValueExpr, ty: FieldType) -> Self {
        Self { expr, ty }
    }
}

impl fmt::Display for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueExpr::Param => write!(f, "$"),
            ValueExpr::Field { base, name } => write!(f, "{}.{}", base, name),
            ValueExpr::Project { source, body } => write!(f, "{}.map({})", source, body),
        }
    }
}

impl fmt::Display for TypedExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.expr, self.ty)
    }
}
