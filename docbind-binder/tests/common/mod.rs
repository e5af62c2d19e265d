//! Shared fixtures for binder tests.

#![allow(dead_code)]

use docbind_binder::{BindResult, DocumentBinder, ObjectResolver};
use docbind_model::{
    ClassSchema, FieldKind, Identity, IdentityDescriptor, Instance, InstanceRef, KeyValue,
    MetadataProvider, Record, ScalarKind, SchemaRegistry,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

pub fn person_schema() -> ClassSchema {
    ClassSchema::new("Person", IdentityDescriptor::surrogate_integer())
        .with_entity_name("P")
        .scalar("name", ScalarKind::String)
        .scalar("age", ScalarKind::Int)
        .field("bestFriend", FieldKind::reference("Person"))
        .field("friends", FieldKind::list("Person"))
}

pub fn book_schema() -> ClassSchema {
    ClassSchema::new("Book", IdentityDescriptor::application(vec![0]))
        .scalar("isbn", ScalarKind::String)
        .scalar("title", ScalarKind::String)
        .scalar("pages", ScalarKind::Short)
}

pub fn library_schema() -> ClassSchema {
    ClassSchema::new("Library", IdentityDescriptor::surrogate_string())
        .field("books", FieldKind::array("Book"))
        .field("tags", FieldKind::set("string"))
        .field("scores", FieldKind::array("int"))
        .field("shelves", FieldKind::map("string", "Book"))
        .field("counts", FieldKind::map("int", "long"))
        .field("location", FieldKind::value("Point"))
        .field("key", FieldKind::value("KeyPath"))
}

pub fn pair_schema() -> ClassSchema {
    ClassSchema::new("Pair", IdentityDescriptor::application(vec![0, 1]))
        .scalar("left", ScalarKind::Int)
        .scalar("right", ScalarKind::Int)
}

/// One field of every scalar kind.
pub fn reading_schema() -> ClassSchema {
    ClassSchema::new("Reading", IdentityDescriptor::surrogate_integer())
        .scalar("flag", ScalarKind::Boolean)
        .scalar("octet", ScalarKind::Byte)
        .scalar("letter", ScalarKind::Char)
        .scalar("small", ScalarKind::Short)
        .scalar("count", ScalarKind::Int)
        .scalar("total", ScalarKind::Long)
        .scalar("ratio", ScalarKind::Float)
        .scalar("precise", ScalarKind::Double)
        .scalar("label", ScalarKind::String)
}

/// Application identity on a one-byte key.
pub fn badge_schema() -> ClassSchema {
    ClassSchema::new("Badge", IdentityDescriptor::application(vec![0]))
        .scalar("code", ScalarKind::Byte)
        .scalar("label", ScalarKind::String)
}

pub fn registry() -> Arc<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    for schema in [
        person_schema(),
        book_schema(),
        library_schema(),
        pair_schema(),
        reading_schema(),
        badge_schema(),
    ] {
        registry.register(schema).unwrap();
    }
    Arc::new(registry)
}

pub fn binder() -> DocumentBinder {
    DocumentBinder::new(registry())
}

pub fn schema(name: &str) -> Arc<ClassSchema> {
    registry().schema_for(name).unwrap()
}

/// Resolver backed by a map of managed instances.
///
/// Records every dirty notification and materializes unmodeled types from
/// registered record templates.
#[derive(Default)]
pub struct MemoryResolver {
    objects: HashMap<Identity, InstanceRef>,
    templates: HashMap<String, Record>,
    dirty: RefCell<Vec<(String, usize)>>,
    lookups: RefCell<Vec<Identity>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a managed instance reachable by its current identity.
    pub fn manage(&mut self, instance: InstanceRef) -> InstanceRef {
        let identity = instance.identity().expect("managed instance needs an identity");
        self.objects.insert(identity, Arc::clone(&instance));
        instance
    }

    /// Adds a managed instance with a surrogate key.
    pub fn manage_surrogate(&mut self, schema: Arc<ClassSchema>, id: impl Into<KeyValue>) -> InstanceRef {
        self.manage(Instance::attached(schema, Some(id.into())))
    }

    pub fn with_template(mut self, record: Record) -> Self {
        self.templates.insert(record.type_name().to_string(), record);
        self
    }

    /// `(type name, position)` for every dirty notification, in order.
    pub fn dirty(&self) -> Vec<(String, usize)> {
        self.dirty.borrow().clone()
    }

    pub fn lookups(&self) -> Vec<Identity> {
        self.lookups.borrow().clone()
    }
}

impl ObjectResolver for MemoryResolver {
    fn find(&self, identity: &Identity) -> BindResult<Option<InstanceRef>> {
        self.lookups.borrow_mut().push(identity.clone());
        Ok(self.objects.get(identity).cloned())
    }

    fn mark_dirty(&self, instance: &InstanceRef, position: usize) {
        self.dirty
            .borrow_mut()
            .push((instance.type_name().to_string(), position));
    }

    fn materialize_new(&self, type_name: &str) -> Option<Record> {
        self.templates.get(type_name).cloned()
    }
}

/// The closed record generic construction uses for `Point`.
pub fn point_template() -> Record {
    Record::new("Point")
        .with_member("x", Some(ScalarKind::Int))
        .with_member("y", Some(ScalarKind::Int))
}
