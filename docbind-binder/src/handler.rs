//! Codecs for types the schema set does not model.

use dashmap::DashMap;
use docbind_model::{Document, Record, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::builtin::{KEY_PATH_TYPE, KeyPathHandler};
use crate::decoder::Decoder;
use crate::error::{BindError, BindResult, FieldPath};

/// Custom construction logic for an unmodeled type.
///
/// Handlers are pure functions of the document and the context: the same
/// handler may be called concurrently from independent decode passes.
pub trait TypeHandler: Send + Sync {
    /// Builds a value from its document form.
    fn from_document(&self, document: &Document, ctx: &mut HandlerContext<'_, '_>) -> BindResult<Value>;

    /// Document form of a record of this type. `Ok(None)` falls back to
    /// encoding the record's members.
    fn to_document(&self, record: &Record) -> BindResult<Option<Document>> {
        let _ = record;
        Ok(None)
    }
}

/// What a handler can reach while decoding.
pub struct HandlerContext<'d, 'a> {
    decoder: &'d mut Decoder<'a>,
}

impl<'d, 'a> HandlerContext<'d, 'a> {
    pub(crate) fn new(decoder: &'d mut Decoder<'a>) -> Self {
        Self { decoder }
    }

    /// Decodes a nested document through the regular discriminator rules,
    /// e.g. a parent component of a composite key.
    pub fn decode_nested(&mut self, document: &Document, type_name: &str) -> BindResult<Value> {
        self.decoder.decode_element(type_name, document)
    }

    /// Where in the document the handler is being applied.
    pub fn path(&self) -> &FieldPath {
        self.decoder.path()
    }

    /// Builds a handler error at the current path.
    pub fn error(&self, type_name: &str, message: impl Into<String>) -> BindError {
        BindError::Handler {
            type_name: type_name.to_string(),
            path: self.path().clone(),
            message: message.into(),
        }
    }
}

/// Creates a handler on first use.
pub type HandlerFactory = Arc<dyn Fn() -> Arc<dyn TypeHandler> + Send + Sync>;

/// Type name → handler, shared by every encode and decode pass.
///
/// Entries live as long as the registry. Registration is first-wins, so
/// registering the same type twice is harmless; concurrent lookups and
/// inserts need nothing beyond the concurrent map.
#[derive(Default)]
pub struct TypeHandlerRegistry {
    handlers: DashMap<String, Arc<dyn TypeHandler>>,
    factories: DashMap<String, HandlerFactory>,
}

impl TypeHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in handlers available for lazy creation.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_factory(KEY_PATH_TYPE, Arc::new(|| Arc::new(KeyPathHandler) as Arc<dyn TypeHandler>));
        registry
    }

    /// Registers a handler. Returns `false` if the type already had one.
    pub fn register(&self, type_name: impl Into<String>, handler: Arc<dyn TypeHandler>) -> bool {
        let mut inserted = false;
        self.handlers.entry(type_name.into()).or_insert_with(|| {
            inserted = true;
            handler
        });
        inserted
    }

    /// Registers a factory that creates the handler the first time the type is looked up.
    pub fn register_factory(&self, type_name: impl Into<String>, factory: HandlerFactory) -> bool {
        let mut inserted = false;
        self.factories.entry(type_name.into()).or_insert_with(|| {
            inserted = true;
            factory
        });
        inserted
    }

    pub fn lookup(&self, type_name: &str) -> Option<Arc<dyn TypeHandler>> {
        if let Some(handler) = self.handlers.get(type_name) {
            return Some(Arc::clone(handler.value()));
        }
        let factory = self.factories.get(type_name).map(|f| Arc::clone(f.value()))?;
        debug!(type_name, "Creating type handler on first use");
        let created = factory();
        let handler = self
            .handlers
            .entry(type_name.to_string())
            .or_insert(created);
        Some(Arc::clone(handler.value()))
    }

    /// Whether a handler has been created for `type_name`.
    pub fn is_instantiated(&self, type_name: &str) -> bool {
        self.handlers.contains_key(type_name)
    }

    /// Whether `type_name` has a handler or a factory for one.
    pub fn handles(&self, type_name: &str) -> bool {
        self.is_instantiated(type_name) || self.factories.contains_key(type_name)
    }

    /// Number of instantiated handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for TypeHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        types.sort();
        f.debug_struct("TypeHandlerRegistry")
            .field("handlers", &types)
            .field("factories", &self.factories.len())
            .finish()
    }
}
