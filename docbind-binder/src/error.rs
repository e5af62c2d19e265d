//! Error types for encoding and decoding.

use std::fmt;
use thiserror::Error;

/// Result type for binder operations.
pub type BindResult<T> = Result<T, BindError>;

/// Errors that can occur while binding documents and instances.
#[derive(Debug, Error)]
pub enum BindError {
    /// The type has no schema, no handler, and could not be constructed generically.
    #[error("unresolved type '{type_name}' at {path}")]
    UnresolvedType { type_name: String, path: FieldPath },

    /// A document literal could not be converted to the target type.
    #[error("cannot convert {found} to {target} at {path}")]
    Conversion {
        path: FieldPath,
        target: String,
        found: String,
    },

    /// A value's shape does not match the field's declared kind.
    #[error("shape mismatch at {path}: expected {expected}, found {found}")]
    ShapeMismatch {
        path: FieldPath,
        expected: &'static str,
        found: &'static str,
    },

    /// Composite application identity.
    #[error("unsupported identity shape for '{type_name}': {key_fields} key fields")]
    UnsupportedIdentityShape { type_name: String, key_fields: usize },

    /// Fewer map entries were decoded than the document contains.
    #[error("map at {path}: decoded {decoded} of {total} entries")]
    MapDecodeIncomplete {
        path: FieldPath,
        decoded: usize,
        total: usize,
    },

    /// A fetch plan selected a position the schema does not have.
    #[error("type '{type_name}' has no field at position {position}")]
    UnknownField { type_name: String, position: usize },

    /// The cycle guard saw an instance that is already being encoded.
    #[error("cycle detected at {path}: '{type_name}' is already being encoded")]
    CycleDetected { path: FieldPath, type_name: String },

    #[error("maximum depth {max_depth} exceeded at {path}")]
    DepthExceeded { path: FieldPath, max_depth: usize },

    /// The object resolver failed to look up an identity.
    #[error("resolver failed for {identity}: {message}")]
    Resolver { identity: String, message: String },

    /// A type handler rejected its document.
    #[error("handler for '{type_name}' failed at {path}: {message}")]
    Handler {
        type_name: String,
        path: FieldPath,
        message: String,
    },

    #[error("model error: {0}")]
    Model(#[from] docbind_model::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Type(String),
    Field(String),
    Index(usize),
    Key(String),
}

/// Location inside a document or object graph: a type followed by a chain
/// of field names, list indices and map keys (`Person.friends[2].name`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn root(type_name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Type(type_name.into())],
        }
    }

    pub fn push_field(&mut self, name: &str) {
        self.segments.push(Segment::Field(name.to_string()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    pub fn push_key(&mut self, key: &str) {
        self.segments.push(Segment::Key(key.to_string()));
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Type(name) | Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Type(name) | Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

impl BindError {
    pub(crate) fn shape(path: &FieldPath, expected: &'static str, found: &'static str) -> Self {
        BindError::ShapeMismatch {
            path: path.clone(),
            expected,
            found,
        }
    }

    pub(crate) fn conversion(path: &FieldPath, target: impl fmt::Display, found: impl fmt::Display) -> Self {
        BindError::Conversion {
            path: path.clone(),
            target: target.to_string(),
            found: found.to_string(),
        }
    }
}
