//! Error types for the Promap core library
//!
//! This module defines the error handling system for Promap, using thiserror
//! for ergonomic error definitions and anyhow for flexible error sources on
//! schema-loading failures.

use thiserror::Error;

/// Main error type for Promap operations
#[derive(Error, Debug)]
pub enum Error {
    /// A convention or override path matched no source field, by exact name
    /// or as a prefix
    #[error("unresolved path '{path}' on type '{type_name}'")]
    UnresolvedPath { path: String, type_name: String },

    /// A path matched more than one source field as a prefix; resolution
    /// never silently picks one candidate
    #[error("ambiguous path '{path}' on type '{type_name}': candidates are {candidates:?}")]
    AmbiguousPath {
        path: String,
        type_name: String,
        candidates: Vec<String>,
    },

    /// A type name was not found in the schema registry
    #[error("unknown type '{name}' in schema registry")]
    UnknownType { name: String },

    /// Schema registration or loading errors
    #[error("schema error: {message}")]
    Schema {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Plan execution failures (coercion, shape mismatches at runtime)
    #[error("execution error: {message}")]
    Execution {
        message: String,
        field: Option<String>,
    },

    /// IO errors while loading schema documents
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
