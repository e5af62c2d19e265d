//! Metadata-driven binding between domain objects and JSON-like documents.
//!
//! [`DocumentBinder`] is the facade. Encoding walks an instance graph using
//! the per-type [`ClassSchema`](docbind_model::ClassSchema) and a
//! [`FetchPlan`]; decoding resolves each object document's concrete type
//! from its `class` discriminator, then either merges it into a managed
//! instance found through an [`ObjectResolver`] or builds a detached one.
//! Types with no schema go through the [`TypeHandlerRegistry`] or, as a last
//! resort, generic construction of a [`Record`](docbind_model::Record).
//!
//! ```ignore
//! let binder = DocumentBinder::new(Arc::new(registry));
//! let person = binder.decode_instance(&json!({"class": "Person", "id": 7}), "Person", &resolver)?;
//! let document = binder.encode(&person, &FetchPlan::all())?;
//! ```

mod binder;
mod builtin;
mod config;
mod convert;
mod decoder;
mod encoder;
mod error;
mod fetch;
mod generic;
mod guard;
mod handler;
mod resolver;
mod token;

pub use binder::DocumentBinder;
pub use builtin::{KEY_PATH_TYPE, KeyPathHandler};
pub use config::{BinderConfig, ConfigError, DEFAULT_MAX_DEPTH, UNBOUNDED};
pub use convert::{from_scalar, key_scalar, to_scalar, untyped};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{BindError, BindResult, FieldPath};
pub use fetch::FetchPlan;
pub use guard::TraversalGuard;
pub use handler::{HandlerContext, HandlerFactory, TypeHandler, TypeHandlerRegistry};
pub use resolver::{DetachedResolver, ObjectResolver};
pub use token::{identity_to_token, token_to_identity};
