use docbind_types::{Identity, KeyValue};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::{ClassSchema, Document, Error, IdentityDescriptor, Result, Value};

/// Shared handle to an instance.
///
/// Object graphs may be cyclic, so instances are reference counted and
/// mutated through interior locks rather than owned by their referrers.
pub type InstanceRef = Arc<Instance>;

/// Where an instance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Owned by an object resolver; field writes are reported back as dirty.
    AttachedExisting,
    /// Built from a document with no backing managed object.
    NewDetached,
}

/// A domain object tagged with its schema.
///
/// Field values are stored densely by schema position. Equality is identity:
/// two handles are equal only if they point at the same instance.
pub struct Instance {
    schema: Arc<ClassSchema>,
    provenance: Provenance,
    surrogate: RwLock<Option<KeyValue>>,
    version: RwLock<Option<Document>>,
    fields: RwLock<Vec<Value>>,
}

impl Instance {
    fn build(schema: Arc<ClassSchema>, provenance: Provenance, surrogate: Option<KeyValue>) -> InstanceRef {
        let fields = schema
            .fields
            .iter()
            .map(|f| Value::default_for(&f.kind))
            .collect();
        Arc::new(Self {
            schema,
            provenance,
            surrogate: RwLock::new(surrogate),
            version: RwLock::new(None),
            fields: RwLock::new(fields),
        })
    }

    /// Creates a detached instance with every field at its default value.
    pub fn new_detached(schema: Arc<ClassSchema>) -> InstanceRef {
        Self::build(schema, Provenance::NewDetached, None)
    }

    /// Creates an instance owned by a resolver.
    pub fn attached(schema: Arc<ClassSchema>, surrogate: Option<KeyValue>) -> InstanceRef {
        Self::build(schema, Provenance::AttachedExisting, surrogate)
    }

    pub fn schema(&self) -> &Arc<ClassSchema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        &self.schema.type_name
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_attached(&self) -> bool {
        self.provenance == Provenance::AttachedExisting
    }

    /// Returns a copy of the value at `position`.
    pub fn get(&self, position: usize) -> Option<Value> {
        self.fields.read().get(position).cloned()
    }

    pub fn get_named(&self, name: &str) -> Option<Value> {
        let field = self.schema.field_named(name)?;
        self.get(field.position)
    }

    pub fn set(&self, position: usize, value: Value) -> Result<()> {
        let mut fields = self.fields.write();
        let slot = fields.get_mut(position).ok_or_else(|| Error::UnknownPosition {
            type_name: self.schema.type_name.clone(),
            position,
        })?;
        *slot = value;
        Ok(())
    }

    pub fn set_named(&self, name: &str, value: Value) -> Result<()> {
        let position = self
            .schema
            .field_named(name)
            .ok_or_else(|| Error::UnknownField {
                type_name: self.schema.type_name.clone(),
                field: name.to_string(),
            })?
            .position;
        self.set(position, value)
    }

    /// Snapshot of all field values, by position.
    pub fn values(&self) -> Vec<Value> {
        self.fields.read().clone()
    }

    pub fn surrogate_id(&self) -> Option<KeyValue> {
        self.surrogate.read().clone()
    }

    pub fn set_surrogate_id(&self, id: Option<KeyValue>) {
        *self.surrogate.write() = id;
    }

    /// Opaque concurrency token, if any.
    pub fn version(&self) -> Option<Document> {
        self.version.read().clone()
    }

    pub fn set_version(&self, version: Option<Document>) {
        *self.version.write() = version;
    }

    /// The identity of this instance, if its key is known.
    ///
    /// Composite application keys have no single identity and yield `None`.
    pub fn identity(&self) -> Option<Identity> {
        match &self.schema.identity {
            IdentityDescriptor::Surrogate { .. } => self
                .surrogate_id()
                .map(|key| Identity::surrogate(self.type_name(), key)),
            IdentityDescriptor::Application { key_positions } => match key_positions.as_slice() {
                [position] => {
                    let key = self.get(*position)?.to_key()?;
                    Some(Identity::application(self.type_name(), *position, key))
                }
                _ => None,
            },
        }
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Instance {}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.schema.type_name)
            .field("provenance", &self.provenance)
            .field("surrogate", &*self.surrogate.read())
            .finish_non_exhaustive()
    }
}
