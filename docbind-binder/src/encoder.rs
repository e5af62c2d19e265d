//! Object graph → document.

use docbind_model::{
    CLASS_KEY, Document, DocumentMap, FieldKind, ID_KEY, IdentityDescriptor, InstanceRef,
    MetadataProvider, Record, VERSION_KEY, Value,
};

use crate::convert::from_scalar;
use crate::error::{BindError, BindResult, FieldPath};
use crate::fetch::FetchPlan;
use crate::guard::TraversalGuard;
use crate::handler::TypeHandlerRegistry;

/// One encode pass.
///
/// Instances are only read: field values are snapshotted before recursing,
/// so no instance lock is held while a nested object is being encoded.
pub struct Encoder<'a> {
    provider: &'a dyn MetadataProvider,
    handlers: &'a TypeHandlerRegistry,
    plan: &'a FetchPlan,
    guard: TraversalGuard,
    path: FieldPath,
}

impl<'a> Encoder<'a> {
    pub fn new(
        provider: &'a dyn MetadataProvider,
        handlers: &'a TypeHandlerRegistry,
        plan: &'a FetchPlan,
        guard: TraversalGuard,
    ) -> Self {
        Self {
            provider,
            handlers,
            plan,
            guard,
            path: FieldPath::default(),
        }
    }

    pub fn encode(&mut self, instance: &InstanceRef) -> BindResult<Document> {
        self.path = FieldPath::root(instance.type_name());
        self.encode_instance(instance)
    }

    fn encode_instance(&mut self, instance: &InstanceRef) -> BindResult<Document> {
        self.guard.enter(instance, &self.path)?;
        let result = self.encode_fields(instance);
        self.guard.leave(instance);
        result
    }

    fn encode_fields(&mut self, instance: &InstanceRef) -> BindResult<Document> {
        let schema = self
            .provider
            .schema_of(instance)
            .ok_or_else(|| BindError::UnresolvedType {
                type_name: instance.type_name().to_string(),
                path: self.path.clone(),
            })?;

        let mut map = DocumentMap::new();
        map.insert(CLASS_KEY.into(), Document::from(schema.type_name.as_str()));
        if let IdentityDescriptor::Surrogate { .. } = schema.identity {
            if let Some(id) = instance.surrogate_id() {
                map.insert(ID_KEY.into(), id.to_json());
            }
        }
        if let Some(version) = instance.version() {
            map.insert(VERSION_KEY.into(), version);
        }

        let values = instance.values();
        let plan = self.plan;
        for &position in plan.positions_for(&schema).iter() {
            let field = schema.field_at(position).ok_or_else(|| BindError::UnknownField {
                type_name: schema.type_name.clone(),
                position,
            })?;
            let value = values.get(position).cloned().unwrap_or(Value::Null);

            self.path.push_field(&field.name);
            let encoded = self.encode_field(&field.kind, &value);
            self.path.pop();

            if let Some(document) = encoded? {
                map.insert(field.name.clone(), document);
            }
        }
        Ok(Document::Object(map))
    }

    /// Encodes one field value. Null values are omitted.
    fn encode_field(&mut self, kind: &FieldKind, value: &Value) -> BindResult<Option<Document>> {
        if value.is_null() {
            return Ok(None);
        }
        let document = match kind {
            FieldKind::Scalar { scalar } => {
                if value.scalar_kind().is_none() {
                    return Err(BindError::shape(&self.path, scalar.type_name(), value.shape()));
                }
                self.encode_scalar(value)?
            }
            FieldKind::SingleValued { target } => match value {
                Value::Object(_) | Value::Record(_) | Value::Document(_) => {
                    self.encode_value(Some(target), value)?
                }
                other => return Err(BindError::shape(&self.path, "object", other.shape())),
            },
            FieldKind::Collection { element, .. } => {
                let items = value
                    .elements()
                    .ok_or_else(|| BindError::shape(&self.path, "list", value.shape()))?;
                self.encode_elements(Some(element), items)?
            }
            FieldKind::Array { element } => {
                let items = value
                    .elements()
                    .ok_or_else(|| BindError::shape(&self.path, "array", value.shape()))?;
                self.encode_elements(Some(element), items)?
            }
            FieldKind::Map { key, value: value_type } => match value {
                Value::Map(entries) => self.encode_entries(Some(key), Some(value_type), entries)?,
                other => return Err(BindError::shape(&self.path, "map", other.shape())),
            },
            FieldKind::Value { type_name } => self.encode_value(Some(type_name), value)?,
        };
        Ok(Some(document))
    }

    /// Encodes a value whose declared type, if known, is `declared`.
    fn encode_value(&mut self, declared: Option<&str>, value: &Value) -> BindResult<Document> {
        match value {
            Value::Null => Ok(Document::Null),
            Value::Object(instance) => self.encode_instance(instance),
            Value::Record(record) => self.encode_record(record),
            Value::Document(document) => Ok(document.clone()),
            Value::List(items) | Value::Set(items) | Value::Array(items) => {
                self.encode_elements(None, items)
            }
            Value::Map(entries) => self.encode_entries(None, None, entries),
            scalar => {
                if declared.is_some_and(|t| self.provider.is_modeled(t)) {
                    return Err(BindError::shape(&self.path, "object", scalar.shape()));
                }
                self.encode_scalar(scalar)
            }
        }
    }

    fn encode_scalar(&self, value: &Value) -> BindResult<Document> {
        from_scalar(value).ok_or_else(|| {
            let target = value.scalar_kind().map_or("scalar", |k| k.type_name());
            BindError::conversion(&self.path, target, "non-finite number")
        })
    }

    fn encode_elements(&mut self, element: Option<&str>, items: &[Value]) -> BindResult<Document> {
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            self.path.push_index(index);
            let encoded = self.encode_value(element, item);
            self.path.pop();
            out.push(encoded?);
        }
        Ok(Document::Array(out))
    }

    /// Maps are written as a list of `{"key", "value"}` pairs so that keys
    /// need not be strings.
    fn encode_entries(
        &mut self,
        key_type: Option<&str>,
        value_type: Option<&str>,
        entries: &[(Value, Value)],
    ) -> BindResult<Document> {
        let mut out = Vec::with_capacity(entries.len());
        for (index, (key, value)) in entries.iter().enumerate() {
            self.path.push_index(index);
            let encoded = self
                .encode_value(key_type, key)
                .and_then(|k| Ok((k, self.encode_value(value_type, value)?)));
            self.path.pop();
            let (key, value) = encoded?;

            let mut pair = DocumentMap::new();
            pair.insert("key".into(), key);
            pair.insert("value".into(), value);
            out.push(Document::Object(pair));
        }
        Ok(Document::Array(out))
    }

    fn encode_record(&mut self, record: &Record) -> BindResult<Document> {
        if let Some(handler) = self.handlers.lookup(record.type_name()) {
            if let Some(document) = handler.to_document(record)? {
                return Ok(document);
            }
        }

        let mut map = DocumentMap::new();
        map.insert(CLASS_KEY.into(), Document::from(record.type_name()));
        for member in record.members() {
            if member.value.is_null() {
                continue;
            }
            self.path.push_field(&member.name);
            let encoded = self.encode_value(None, &member.value);
            self.path.pop();
            map.insert(member.name.clone(), encoded?);
        }
        Ok(Document::Object(map))
    }
}
