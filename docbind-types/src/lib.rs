//! Core type definitions for docbind.
//!
//! This crate defines the small, schema-agnostic vocabulary shared by the
//! model and the binder:
//! - [`ScalarKind`]: the nine literal field types a schema can declare
//! - [`KeyValue`]: a hashable identity key (surrogate or single key field)
//! - [`Identity`]: a key qualified by the type it identifies
//!
//! Everything that knows about schemas, instances or documents lives in
//! `docbind-model` and `docbind-binder`, not here.

mod ids;
mod scalar;

pub use ids::{Identity, IdentityOrigin, KeyValue};
pub use scalar::ScalarKind;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown scalar kind: {0}")]
    UnknownScalarKind(String),

    #[error("invalid {kind} key: {input:?}")]
    InvalidKey { kind: &'static str, input: String },
}
