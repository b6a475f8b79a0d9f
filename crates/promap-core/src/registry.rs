//! Schema registry: the field-metadata provider behind projection synthesis
//!
//! A [`SchemaRegistry`] holds one [`TypeSchema`] per registered type name and
//! is immutable once handed to a projector. Registries can be built in code
//! or loaded from a JSON schema document.

use crate::error::{Error, Result};
use crate::types::TypeSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk schema document: a flat list of type schemas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub schemas: Vec<TypeSchema>,
}

/// Registry of type schemas, keyed by type name
///
/// Lookup is deterministic and side-effect-free; metadata is assumed fixed
/// for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: BTreeMap<String, TypeSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its own type name
    ///
    /// Registering the same name twice is a configuration mistake and fails
    /// rather than silently replacing metadata.
    pub fn register(&mut self, schema: TypeSchema) -> Result<()> {
        if self.types.contains_key(&schema.name) {
            return Err(Error::Schema {
                message: format!("type '{}' is already registered", schema.name),
                source: None,
            });
        }
        self.types.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Look up a schema by type name
    pub fn get(&self, name: &str) -> Option<&TypeSchema> {
        self.types.get(name)
    }

    /// Look up a schema by type name, failing with `UnknownType` if absent
    pub fn require(&self, name: &str) -> Result<&TypeSchema> {
        self.get(name).ok_or_else(|| Error::UnknownType {
            name: name.to_string(),
        })
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names, in sorted order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Build a registry from a JSON schema document string
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: SchemaDocument =
            serde_json::from_str(content).map_err(|e| Error::Json {
                message: format!("failed to parse schema document: {}", e),
                source: e,
            })?;
        Self::from_document(document)
    }

    /// Build a registry from a JSON schema document on disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            message: format!("failed to read schema document from {:?}", path),
            source: e,
        })?;
        Self::from_json_str(&content).map_err(|e| match e {
            Error::Json { message, source } => Error::Schema {
                message: format!("invalid schema document {:?}: {}", path, message),
                source: Some(source.into()),
            },
            other => other,
        })
    }

    fn from_document(document: SchemaDocument) -> Result<Self> {
        let mut registry = Self::new();
        for schema in document.schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }
}
