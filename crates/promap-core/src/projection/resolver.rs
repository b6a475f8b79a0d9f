//! Convention-path resolution against source schemas
//!
//! This module resolves a destination field name (or explicit override path)
//! into a chain of typed field accesses on the source type. Matching is
//! case-insensitive; an exact field-name match always wins over a prefix
//! ("flattening") match, and multiple valid prefixes are a fatal ambiguity
//! rather than something resolution would silently tie-break. Collection
//! fields hand the remaining path to an element-wise projection step built
//! against the element type.
//!
//! Copyright (c) 2025 Promap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::projection::expr::{TypedExpr, ValueExpr};
use crate::registry::SchemaRegistry;
use crate::types::{ContainerKind, FieldDescriptor, FieldType, TypeSchema};
use tracing::trace;

/// Resolves convention paths into typed value expressions
pub struct PathResolver<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver over the given registry
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `path` against `source`, rooted at `root`
    ///
    /// Returns the resolved expression and its static type. Fails with
    /// `UnresolvedPath` when no field matches by exact name or prefix at any
    /// level, and `AmbiguousPath` when more than one field is a valid prefix.
    pub fn resolve(
        &self,
        root: ValueExpr,
        path: &str,
        source: &TypeSchema,
    ) -> Result<TypedExpr> {
        let (field, remainder) = self.select(path, source)?;
        trace!(
            path,
            field = %field.name,
            remainder,
            source_type = %source.name,
            "selected path segment"
        );

        let access = ValueExpr::field(root, &field.name);
        if let FieldType::Collection { container, element } = &field.ty {
            // Terminal: the projection step consumes the whole remainder.
            return self.collection_step(access, &field.ty, *container, element, remainder);
        }

        if remainder.is_empty() {
            return Ok(TypedExpr::new(access, field.ty.clone()));
        }
        match &field.ty {
            FieldType::Object(name) => {
                let nested = self.registry.require(name)?;
                self.resolve(access, remainder, nested)
            }
            other => Err(Error::UnresolvedPath {
                path: remainder.to_string(),
                type_name: other.to_string(),
            }),
        }
    }

    /// Select the field that `path` starts with, returning it and the
    /// unconsumed remainder of the path
    ///
    /// Exact match consumes the whole path. Otherwise every field whose name
    /// is a strict case-insensitive prefix of `path` is a candidate: exactly
    /// one is required.
    fn select<'s, 'p>(
        &self,
        path: &'p str,
        source: &'s TypeSchema,
    ) -> Result<(&'s FieldDescriptor, &'p str)> {
        if let Some(field) = source
            .fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(path))
        {
            return Ok((field, ""));
        }

        let candidates: Vec<&FieldDescriptor> = source
            .fields
            .iter()
            .filter(|f| is_name_prefix(&f.name, path))
            .collect();
        match candidates.as_slice() {
            &[field] => Ok((field, &path[field.name.len()..])),
            [] => Err(Error::UnresolvedPath {
                path: path.to_string(),
                type_name: source.name.clone(),
            }),
            _ => Err(Error::AmbiguousPath {
                path: path.to_string(),
                type_name: source.name.clone(),
                candidates: candidates.iter().map(|f| f.name.clone()).collect(),
            }),
        }
    }

    /// Build the projection step for a collection field
    ///
    /// With a blank remainder the caller wants the whole collection and the
    /// bare access is returned unchanged. Otherwise the remainder is resolved
    /// against the element type with a fresh parameter, and the access is
    /// wrapped in an element-wise projection; the result type is a sequence
    /// of the body's type.
    fn collection_step(
        &self,
        access: ValueExpr,
        collection_ty: &FieldType,
        container: ContainerKind,
        element: &FieldType,
        remainder: &str,
    ) -> Result<TypedExpr> {
        if remainder.trim().is_empty() {
            return Ok(TypedExpr::new(access, collection_ty.clone()));
        }
        match element {
            FieldType::Object(name) => {
                let element_schema = self.registry.require(name)?;
                let body = self.resolve(ValueExpr::Param, remainder, element_schema)?;
                Ok(TypedExpr::new(
                    ValueExpr::project(access, body.expr),
                    FieldType::collection(container, body.ty),
                ))
            }
            other => Err(Error::UnresolvedPath {
                path: remainder.to_string(),
                type_name: other.to_string(),
            }),
        }
    }
}

/// Whether `name` is a strict case-insensitive prefix of `path`
///
/// Field names are ASCII identifiers; comparison is byte-wise ASCII folding.
fn is_name_prefix(name: &str, path: &str) -> bool {
    path.len() > name.len()
        && path
            .get(..name.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(name))
}
