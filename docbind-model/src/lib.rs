//! Core object model for docbind.
//!
//! Defines the types the binder moves between documents and domain objects:
//! - [`ClassSchema`]: a type's ordered fields and identity descriptor
//! - [`FieldKind`] / [`RelationKind`]: the closed set of field shapes
//! - [`SchemaRegistry`] / [`MetadataProvider`]: where schemas come from
//! - [`Instance`]: a schema-tagged object, attached or detached
//! - [`Value`] / [`Record`]: runtime field values, including unmodeled types
//! - [`Document`]: the JSON-like wire tree and its reserved keys
//!
//! Nothing here knows how to encode or decode; that is `docbind-binder`.

mod document;
mod instance;
mod registry;
mod schema;
mod value;

pub use document::{
    CLASS_KEY, Document, DocumentMap, ID_KEY, VERSION_KEY, is_reserved_key, shape_of,
};
pub use instance::{Instance, InstanceRef, Provenance};
pub use registry::{MetadataProvider, SchemaRegistry};
pub use schema::{
    ClassSchema, FieldDescriptor, FieldKind, IdentityDescriptor, RelationKind, SurrogateType,
};
pub use value::{Member, Record, Value};

pub use docbind_types::{Identity, IdentityOrigin, KeyValue, ScalarKind};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building schemas or mutating instances and records.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("schema '{type_name}': field '{field}' declared at position {actual}, expected {expected}")]
    PositionMismatch {
        type_name: String,
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("schema '{type_name}': duplicate field '{field}'")]
    DuplicateField { type_name: String, field: String },

    #[error("schema '{type_name}': key position {position} is out of range")]
    KeyOutOfRange { type_name: String, position: usize },

    #[error("schema '{type_name}': key field '{field}' is not a scalar")]
    KeyNotScalar { type_name: String, field: String },

    #[error("schema '{type_name}': application identity declares no key fields")]
    NoKeyFields { type_name: String },

    #[error("type '{0}' is already registered")]
    DuplicateType(String),

    #[error("type '{type_name}' has no field at position {position}")]
    UnknownPosition { type_name: String, position: usize },

    #[error("type '{type_name}' has no field named '{field}'")]
    UnknownField { type_name: String, field: String },

    #[error("type '{type_name}' has no public member '{member}'")]
    NoSuchMember { type_name: String, member: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
