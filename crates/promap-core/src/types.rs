//! Schema model for Promap
//!
//! These types describe the field metadata that drives projection synthesis:
//! scalar and container kinds, field types, per-field overrides, and the
//! per-type schemas that a [`crate::registry::SchemaRegistry`] holds. Schemas
//! derive serde so registries can be declared in JSON documents and loaded
//! from files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Atomic value kinds. Strings are scalars here and are never treated as
/// collections during path resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Bool,
}

/// Supported destination container kinds for collection materialization.
///
/// List-like and array-like containers are the two kinds collection binding
/// can coerce between; other container kinds are not handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    List,
    Array,
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "spec", rename_all = "snake_case")]
pub enum FieldType {
    /// An atomic scalar value
    Scalar(ScalarKind),
    /// A structured value, referenced by its registered type name
    Object(String),
    /// A sequence of elements with a single declared element type
    Collection {
        container: ContainerKind,
        element: Box<FieldType>,
    },
}

impl FieldType {
    /// Shorthand for a collection type
    pub fn collection(container: ContainerKind, element: FieldType) -> Self {
        FieldType::Collection {
            container,
            element: Box::new(element),
        }
    }

    /// Whether this type is a collection
    pub fn is_collection(&self) -> bool {
        matches!(self, FieldType::Collection { .. })
    }

    /// The element type, if this is a collection
    pub fn element_type(&self) -> Option<&FieldType> {
        match self {
            FieldType::Collection { element, .. } => Some(element),
            _ => None,
        }
    }

    /// The scalar kind, if this is a scalar
    pub fn as_scalar(&self) -> Option<ScalarKind> {
        match self {
            FieldType::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    /// The referenced type name, if this is an object
    pub fn as_object(&self) -> Option<&str> {
        match self {
            FieldType::Object(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::String => write!(f, "string"),
            ScalarKind::Int => write!(f, "int"),
            ScalarKind::Float => write!(f, "float"),
            ScalarKind::Bool => write!(f, "bool"),
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::List => write!(f, "list"),
            ContainerKind::Array => write!(f, "array"),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(kind) => write!(f, "{}", kind),
            FieldType::Object(name) => write!(f, "{}", name),
            FieldType::Collection { container, element } => {
                write!(f, "{}<{}>", container, element)
            }
        }
    }
}

/// Metadata for a single field of a registered type
///
/// `source_path` is the explicit override path consulted instead of the
/// field's own name during resolution; `excluded` marks the field as never
/// mapped. Absence of both means default convention: map by own name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub excluded: bool,
}

impl FieldDescriptor {
    /// Create a descriptor with default convention (no override, included)
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            source_path: None,
            excluded: false,
        }
    }
}

/// Ordered field metadata for a single type
///
/// Immutable once registered; field order is the order bindings are emitted
/// in during synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeSchema {
    /// Start building a schema with a fluent builder
    pub fn builder(name: impl Into<String>) -> TypeSchemaBuilder {
        TypeSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Look up a field by exact name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Fluent builder for [`TypeSchema`]
///
/// The override and exclusion modifiers apply to the most recently added
/// field:
///
/// ```
/// use promap_core::TypeSchema;
///
/// let schema = TypeSchema::builder("OrderView")
///     .string("CustomerName")
///     .float("Total").mapped_from("GrandTotal")
///     .string("AuditToken").exclude()
///     .build();
/// assert_eq!(schema.fields.len(), 3);
/// assert!(schema.field("AuditToken").unwrap().excluded);
/// ```
#[derive(Debug, Clone)]
pub struct TypeSchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl TypeSchemaBuilder {
    /// Add a fully specified field descriptor
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    /// Add a field of an arbitrary type
    pub fn typed(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.field(FieldDescriptor::new(name, ty))
    }

    /// Add a string field
    pub fn string(self, name: impl Into<String>) -> Self {
        self.typed(name, FieldType::Scalar(ScalarKind::String))
    }

    /// Add an int field
    pub fn int(self, name: impl Into<String>) -> Self {
        self.typed(name, FieldType::Scalar(ScalarKind::Int))
    }

    /// Add a float field
    pub fn float(self, name: impl Into<String>) -> Self {
        self.typed(name, FieldType::Scalar(ScalarKind::Float))
    }

    /// Add a bool field
    pub fn bool(self, name: impl Into<String>) -> Self {
        self.typed(name, FieldType::Scalar(ScalarKind::Bool))
    }

    /// Add an object field referencing a registered type
    pub fn object(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.typed(name, FieldType::Object(type_name.into()))
    }

    /// Add a list field with the given element type
    pub fn list_of(self, name: impl Into<String>, element: FieldType) -> Self {
        self.typed(name, FieldType::collection(ContainerKind::List, element))
    }

    /// Add an array field with the given element type
    pub fn array_of(self, name: impl Into<String>, element: FieldType) -> Self {
        self.typed(name, FieldType::collection(ContainerKind::Array, element))
    }

    /// Set an explicit source path on the most recently added field
    pub fn mapped_from(mut self, source_path: impl Into<String>) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.source_path = Some(source_path.into());
        }
        self
    }

    /// Mark the most recently added field as excluded from mapping
    pub fn exclude(mut self) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.excluded = true;
        }
        self
    }

    /// Finalize the schema
    pub fn build(self) -> TypeSchema {
        TypeSchema {
            name: self.name,
            fields: self.fields,
        }
    }
}
