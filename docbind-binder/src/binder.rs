use docbind_model::{
    Document, ID_KEY, Identity, IdentityOrigin, InstanceRef, MetadataProvider, Value, shape_of,
};
use std::sync::Arc;

use crate::config::BinderConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{BindError, BindResult, FieldPath};
use crate::fetch::FetchPlan;
use crate::handler::TypeHandlerRegistry;
use crate::resolver::ObjectResolver;
use crate::token::token_to_identity;

/// Entry point for moving objects to and from documents.
///
/// The binder holds only shared, read-mostly state: schemas, handlers and
/// configuration. Each call builds its own encoder or decoder, so one binder
/// can serve concurrent calls on independent object graphs.
#[derive(Clone)]
pub struct DocumentBinder {
    provider: Arc<dyn MetadataProvider>,
    handlers: Arc<TypeHandlerRegistry>,
    config: BinderConfig,
}

impl DocumentBinder {
    /// A binder with the built-in handlers and default configuration.
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self::with_handlers(provider, Arc::new(TypeHandlerRegistry::with_builtins()))
    }

    pub fn with_handlers(provider: Arc<dyn MetadataProvider>, handlers: Arc<TypeHandlerRegistry>) -> Self {
        Self {
            provider,
            handlers,
            config: BinderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(&self) -> &Arc<dyn MetadataProvider> {
        &self.provider
    }

    pub fn handlers(&self) -> &Arc<TypeHandlerRegistry> {
        &self.handlers
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Encodes an instance and the part of its graph selected by `plan`.
    pub fn encode(&self, instance: &InstanceRef, plan: &FetchPlan) -> BindResult<Document> {
        Encoder::new(self.provider.as_ref(), &self.handlers, plan, self.config.guard()).encode(instance)
    }

    /// Encodes several instances into a list document, in order.
    pub fn encode_all(&self, instances: &[InstanceRef], plan: &FetchPlan) -> BindResult<Document> {
        instances
            .iter()
            .map(|instance| self.encode(instance, plan))
            .collect::<BindResult<Vec<_>>>()
            .map(Document::Array)
    }

    /// Decodes a document whose declared type is `declared`.
    ///
    /// A `class` key in the document overrides the declared type. Modeled
    /// types decode to [`Value::Object`].
    pub fn decode(&self, document: &Document, declared: &str, resolver: &dyn ObjectResolver) -> BindResult<Value> {
        Decoder::new(self.provider.as_ref(), &self.handlers, resolver, self.config.guard())
            .decode(document, declared)
    }

    /// Decodes a document that must describe a modeled object.
    pub fn decode_instance(
        &self,
        document: &Document,
        declared: &str,
        resolver: &dyn ObjectResolver,
    ) -> BindResult<InstanceRef> {
        match self.decode(document, declared, resolver)? {
            Value::Object(instance) => Ok(instance),
            other => Err(BindError::shape(&FieldPath::root(declared), "object", other.shape())),
        }
    }

    /// Parses an identity token for `type_name`.
    pub fn identity_from_token(&self, type_name: &str, token: &str) -> BindResult<Identity> {
        let schema = self.provider.schema_for(type_name).ok_or_else(|| BindError::UnresolvedType {
            type_name: type_name.to_string(),
            path: FieldPath::default(),
        })?;
        token_to_identity(token, &schema)
    }

    /// Writes `identity` into an object document before it is decoded, so a
    /// document addressed by URL updates the object the URL names.
    pub fn apply_identity(&self, document: &mut Document, identity: &Identity) -> BindResult<()> {
        let path = FieldPath::root(identity.type_name.as_str());
        let found = shape_of(document);
        let Some(map) = document.as_object_mut() else {
            return Err(BindError::shape(&path, "object", found));
        };
        let key = match identity.origin {
            IdentityOrigin::Surrogate => ID_KEY.to_string(),
            IdentityOrigin::Application { position } => {
                let schema = self.provider.schema_for(&identity.type_name).ok_or_else(|| {
                    BindError::UnresolvedType {
                        type_name: identity.type_name.clone(),
                        path: path.clone(),
                    }
                })?;
                schema
                    .field_at(position)
                    .ok_or(BindError::UnknownField {
                        type_name: identity.type_name.clone(),
                        position,
                    })?
                    .name
                    .clone()
            }
        };
        map.insert(key, identity.key.to_json());
        Ok(())
    }
}

impl std::fmt::Debug for DocumentBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentBinder")
            .field("handlers", &self.handlers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
