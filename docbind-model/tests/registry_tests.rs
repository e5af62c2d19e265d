use docbind_model::{
    ClassSchema, Error, IdentityDescriptor, Instance, MetadataProvider, ScalarKind, SchemaRegistry,
};
use std::sync::Arc;

fn person() -> ClassSchema {
    ClassSchema::new("app.model.Person", IdentityDescriptor::surrogate_integer())
        .with_entity_name("Person")
        .scalar("name", ScalarKind::String)
}

#[test]
fn lookup_by_full_name_and_alias() {
    let registry = SchemaRegistry::new().with(person()).unwrap();
    let by_name = registry.schema_for("app.model.Person").unwrap();
    let by_alias = registry.schema_for("Person").unwrap();
    assert!(Arc::ptr_eq(&by_name, &by_alias));
    assert!(registry.is_modeled("Person"));
    assert!(!registry.is_modeled("Pet"));
}

#[test]
fn schema_of_instance() {
    let registry = SchemaRegistry::new().with(person()).unwrap();
    let schema = registry.schema_for("Person").unwrap();
    let instance = Instance::new_detached(schema);
    let found = registry.schema_of(&instance).unwrap();
    assert_eq!(found.type_name, "app.model.Person");
}

#[test]
fn duplicate_registration_fails() {
    let mut registry = SchemaRegistry::new();
    registry.register(person()).unwrap();
    let err = registry.register(person()).unwrap_err();
    assert!(matches!(err, Error::DuplicateType(name) if name == "app.model.Person"));
}

#[test]
fn alias_colliding_with_type_name_fails() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(ClassSchema::new("Person", IdentityDescriptor::surrogate_integer()))
        .unwrap();
    assert!(registry.register(person()).is_err());
}

#[test]
fn invalid_schema_is_rejected() {
    let mut registry = SchemaRegistry::new();
    let mut schema = person();
    schema.fields[0].position = 4;
    assert!(registry.register(schema).is_err());
    assert!(registry.is_empty());
}

#[test]
fn load_from_json() {
    let registry = SchemaRegistry::from_json(
        r#"[
            {
                "type_name": "Person",
                "identity": {"kind": "surrogate", "value_type": "integer"},
                "fields": [
                    {"name": "name", "position": 0, "kind": "scalar", "scalar": "string"},
                    {"name": "bestFriend", "position": 1, "kind": "single_valued", "target": "Person"}
                ]
            },
            {
                "type_name": "Book",
                "identity": {"kind": "application", "key_positions": [0]},
                "fields": [
                    {"name": "isbn", "position": 0, "kind": "scalar", "scalar": "string"}
                ]
            }
        ]"#,
    )
    .unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.type_names(), vec!["Book", "Person"]);
}

#[test]
fn load_from_malformed_json_fails() {
    let err = SchemaRegistry::from_json("[{\"type_name\": 3}]").unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}
