//! Document → object graph.
//!
//! Every object document goes through the same steps: the `class`
//! discriminator picks the effective type, a modeled type then computes its
//! identity and asks the resolver for a managed instance. A hit is merged in
//! place and each overwritten field is reported dirty; a miss, or a document
//! with no usable identity, becomes a new detached instance. Types without a
//! schema go to a registered handler or, failing that, generic construction.

use docbind_model::{
    CLASS_KEY, ClassSchema, Document, DocumentMap, FieldKind, ID_KEY, Identity,
    IdentityDescriptor, Instance, InstanceRef, MetadataProvider, ScalarKind, VERSION_KEY, Value,
    shape_of,
};
use std::sync::Arc;
use tracing::debug;

use crate::convert::{key_scalar, surrogate_key, to_scalar, untyped};
use crate::error::{BindError, BindResult, FieldPath};
use crate::generic;
use crate::guard::TraversalGuard;
use crate::handler::{HandlerContext, TypeHandlerRegistry};
use crate::resolver::ObjectResolver;

/// One decode pass.
pub struct Decoder<'a> {
    provider: &'a dyn MetadataProvider,
    handlers: &'a TypeHandlerRegistry,
    resolver: &'a dyn ObjectResolver,
    guard: TraversalGuard,
    path: FieldPath,
}

impl<'a> Decoder<'a> {
    pub fn new(
        provider: &'a dyn MetadataProvider,
        handlers: &'a TypeHandlerRegistry,
        resolver: &'a dyn ObjectResolver,
        guard: TraversalGuard,
    ) -> Self {
        Self {
            provider,
            handlers,
            resolver,
            guard,
            path: FieldPath::default(),
        }
    }

    /// Decodes a document whose declared type is `declared`.
    pub fn decode(&mut self, document: &Document, declared: &str) -> BindResult<Value> {
        self.path = FieldPath::root(declared);
        self.decode_element(declared, document)
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Decodes a value of declared type `declared`: a scalar type name, a
    /// modeled type, or an unmodeled one.
    pub(crate) fn decode_element(&mut self, declared: &str, document: &Document) -> BindResult<Value> {
        if document.is_null() {
            return Ok(Value::Null);
        }
        let modeled = self.provider.is_modeled(declared);
        if !modeled {
            if let Some(kind) = ScalarKind::from_type_name(declared) {
                return to_scalar(kind, document, &self.path);
            }
        }
        if let Document::Object(map) = document {
            return self.decode_object(document, map, declared);
        }
        if modeled {
            return Err(BindError::shape(&self.path, "object", shape_of(document)));
        }
        match self.handlers.lookup(declared) {
            Some(handler) => handler.from_document(document, &mut HandlerContext::new(self)),
            None => Ok(untyped(document)),
        }
    }

    fn decode_object(&mut self, document: &Document, map: &DocumentMap, declared: &str) -> BindResult<Value> {
        let type_name = match map.get(CLASS_KEY) {
            None => declared.to_string(),
            Some(Document::String(name)) => name.clone(),
            Some(other) => return Err(BindError::shape(&self.path, "string", shape_of(other))),
        };

        self.guard.descend(&self.path)?;
        let result = match self.provider.schema_for(&type_name) {
            Some(schema) => self.decode_modeled(schema, map).map(Value::Object),
            None => self.decode_unmodeled(&type_name, document, map),
        };
        self.guard.ascend();
        result
    }

    fn decode_modeled(&mut self, schema: Arc<ClassSchema>, map: &DocumentMap) -> BindResult<InstanceRef> {
        let identity = self.identity_of(&schema, map)?;
        let existing = match &identity {
            Some(identity) => self.resolver.find(identity)?,
            None => None,
        };

        let instance = match existing {
            Some(instance) => {
                debug!(identity = ?identity, path = %self.path, "Merging document into managed instance");
                let bound_schema = Arc::clone(instance.schema());
                self.populate(&instance, &bound_schema, map, true)?;
                instance
            }
            None => {
                match &identity {
                    Some(identity) => {
                        debug!(%identity, path = %self.path, "Identity not found, decoding detached")
                    }
                    None => debug!(type_name = %schema.type_name, path = %self.path, "No identity, decoding detached"),
                }
                let instance = Instance::new_detached(Arc::clone(&schema));
                self.populate(&instance, &schema, map, false)?;
                instance
            }
        };

        if let Some(version) = map.get(VERSION_KEY) {
            instance.set_version((!version.is_null()).then(|| version.clone()));
        }
        Ok(instance)
    }

    /// The identity a document carries, if any.
    ///
    /// A missing or unconvertible key is not an error: the document simply
    /// has no identity and decodes detached.
    fn identity_of(&self, schema: &ClassSchema, map: &DocumentMap) -> BindResult<Option<Identity>> {
        match &schema.identity {
            IdentityDescriptor::Surrogate { value_type } => Ok(map
                .get(ID_KEY)
                .and_then(|id| surrogate_key(*value_type, id))
                .map(|key| Identity::surrogate(schema.type_name.as_str(), key))),
            IdentityDescriptor::Application { key_positions } => match key_positions.as_slice() {
                [position] => {
                    let Some(field) = schema.field_at(*position) else {
                        return Ok(None);
                    };
                    let (Some(kind), Some(document)) = (field.kind.scalar_kind(), map.get(&field.name))
                    else {
                        return Ok(None);
                    };
                    if document.is_null() {
                        return Ok(None);
                    }
                    Ok(key_scalar(kind, document, &self.path)
                        .ok()
                        .and_then(|value| value.to_key())
                        .map(|key| Identity::application(schema.type_name.as_str(), *position, key)))
                }
                positions => Err(BindError::UnsupportedIdentityShape {
                    type_name: schema.type_name.clone(),
                    key_fields: positions.len(),
                }),
            },
        }
    }

    /// Assigns every field present in the document. Absent fields keep their
    /// current value; `null` clears.
    ///
    /// Nothing is assigned or marked dirty unless every present field decodes.
    fn populate(
        &mut self,
        instance: &InstanceRef,
        schema: &ClassSchema,
        map: &DocumentMap,
        bound: bool,
    ) -> BindResult<()> {
        let mut staged = Vec::with_capacity(map.len());
        for field in &schema.fields {
            let Some(document) = map.get(&field.name) else {
                continue;
            };
            self.path.push_field(&field.name);
            let value = if document.is_null() {
                Ok(Value::Null)
            } else {
                self.decode_field(&field.kind, document)
            };
            self.path.pop();
            staged.push((field.position, value?));
        }

        for (position, value) in staged {
            instance.set(position, value)?;
            if bound {
                self.resolver.mark_dirty(instance, position);
            }
        }
        Ok(())
    }

    fn decode_field(&mut self, kind: &FieldKind, document: &Document) -> BindResult<Value> {
        match kind {
            FieldKind::Scalar { scalar } => to_scalar(*scalar, document, &self.path),
            FieldKind::SingleValued { target } => {
                if !document.is_object() {
                    return Err(BindError::shape(&self.path, "object", shape_of(document)));
                }
                self.decode_element(target, document)
            }
            FieldKind::Collection { element, ordered } => {
                let items = self.decode_list(element, document, "list")?;
                Ok(if *ordered {
                    Value::List(items)
                } else {
                    Value::Set(dedup(items))
                })
            }
            FieldKind::Array { element } => self.decode_list(element, document, "array").map(Value::Array),
            FieldKind::Map { key, value } => self.decode_map(key, value, document),
            FieldKind::Value { type_name } => self.decode_element(type_name, document),
        }
    }

    fn decode_list(&mut self, element: &str, document: &Document, expected: &'static str) -> BindResult<Vec<Value>> {
        let Document::Array(items) = document else {
            return Err(BindError::shape(&self.path, expected, shape_of(document)));
        };
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            self.path.push_index(index);
            let value = self.decode_element(element, item);
            self.path.pop();
            out.push(value?);
        }
        Ok(out)
    }

    /// Decodes a map from its pair-list form, or from an object with string keys.
    /// A later entry with an equal key replaces the earlier one.
    fn decode_map(&mut self, key_type: &str, value_type: &str, document: &Document) -> BindResult<Value> {
        let mut entries: Vec<(Value, Value)> = Vec::new();
        let mut decoded = 0;
        let total = match document {
            Document::Array(pairs) => {
                for (index, pair) in pairs.iter().enumerate() {
                    self.path.push_index(index);
                    let entry = self.decode_pair(key_type, value_type, pair);
                    self.path.pop();
                    let (key, value) = entry?;
                    insert_entry(&mut entries, key, value);
                    decoded += 1;
                }
                pairs.len()
            }
            Document::Object(map) => {
                for (key, value) in map {
                    self.path.push_key(key);
                    let entry = self
                        .decode_element(key_type, &Document::String(key.clone()))
                        .and_then(|k| Ok((k, self.decode_element(value_type, value)?)));
                    self.path.pop();
                    let (key, value) = entry?;
                    insert_entry(&mut entries, key, value);
                    decoded += 1;
                }
                map.len()
            }
            other => return Err(BindError::shape(&self.path, "map", shape_of(other))),
        };

        if decoded != total {
            return Err(BindError::MapDecodeIncomplete {
                path: self.path.clone(),
                decoded,
                total,
            });
        }
        Ok(Value::Map(entries))
    }

    fn decode_pair(&mut self, key_type: &str, value_type: &str, pair: &Document) -> BindResult<(Value, Value)> {
        let Some(key) = pair.get("key") else {
            return Err(BindError::shape(&self.path, "key/value pair", shape_of(pair)));
        };
        let key = self.decode_element(key_type, key)?;
        let value = match pair.get("value") {
            Some(value) => self.decode_element(value_type, value)?,
            None => Value::Null,
        };
        Ok((key, value))
    }

    fn decode_unmodeled(&mut self, type_name: &str, document: &Document, map: &DocumentMap) -> BindResult<Value> {
        if let Some(handler) = self.handlers.lookup(type_name) {
            debug!(type_name, path = %self.path, "Decoding with type handler");
            return handler.from_document(document, &mut HandlerContext::new(self));
        }
        debug!(type_name, path = %self.path, "No schema or handler, constructing generically");
        generic::construct(self.resolver, map, type_name, &self.path).map(Value::Record)
    }
}

fn insert_entry(entries: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    match entries.iter_mut().find(|(existing, _)| *existing == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

/// Drops repeated elements, keeping the first occurrence of each.
fn dedup(items: Vec<Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
