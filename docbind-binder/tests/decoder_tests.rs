mod common;

use common::{MemoryResolver, binder, point_template, schema};
use docbind_binder::{BindError, BinderConfig, DetachedResolver, KeyPathHandler};
use docbind_model::{Identity, Instance, Provenance, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── Discriminator ────────────────────────────────────────────────

#[test]
fn declared_type_used_without_class_key() {
    let person = binder()
        .decode_instance(&json!({"name": "Ann"}), "Person", &DetachedResolver)
        .unwrap();
    assert_eq!(person.type_name(), "Person");
    assert_eq!(person.get_named("name"), Some(Value::from("Ann")));
}

#[test]
fn class_key_overrides_declared_type() {
    let value = binder()
        .decode(&json!({"class": "Book", "isbn": "x-1"}), "Person", &DetachedResolver)
        .unwrap();
    let book = value.as_instance().unwrap();
    assert_eq!(book.type_name(), "Book");
}

#[test]
fn class_key_accepts_entity_alias() {
    let person = binder()
        .decode_instance(&json!({"class": "P", "name": "Ann"}), "Book", &DetachedResolver)
        .unwrap();
    assert_eq!(person.type_name(), "Person");
}

#[test]
fn non_string_class_is_shape_mismatch() {
    let err = binder()
        .decode(&json!({"class": 5}), "Person", &DetachedResolver)
        .unwrap_err();
    assert!(matches!(err, BindError::ShapeMismatch { expected: "string", found: "number", .. }));
}

// ── Identity resolution ──────────────────────────────────────────

#[test]
fn no_identity_decodes_detached() {
    let mut resolver = MemoryResolver::new();
    resolver.manage_surrogate(schema("Person"), 7);

    let person = binder()
        .decode_instance(&json!({"class": "Person", "name": "Bo"}), "Person", &resolver)
        .unwrap();
    assert_eq!(person.provenance(), Provenance::NewDetached);
    assert!(resolver.lookups().is_empty());
    assert!(resolver.dirty().is_empty());
}

#[test]
fn identity_miss_decodes_detached_without_dirty_marks() {
    let resolver = MemoryResolver::new();
    let person = binder()
        .decode_instance(&json!({"class": "Person", "_id": 99, "name": "Cy"}), "Person", &resolver)
        .unwrap();
    assert_eq!(person.provenance(), Provenance::NewDetached);
    assert_eq!(person.get_named("name"), Some(Value::from("Cy")));
    assert_eq!(person.surrogate_id(), None);
    assert_eq!(resolver.lookups(), vec![Identity::surrogate("Person", 99)]);
    assert!(resolver.dirty().is_empty());
}

#[test]
fn string_surrogate_id_parses_for_integer_identity() {
    let mut resolver = MemoryResolver::new();
    let managed = resolver.manage_surrogate(schema("Person"), 7);
    let person = binder()
        .decode_instance(&json!({"_id": "7"}), "Person", &resolver)
        .unwrap();
    assert!(std::sync::Arc::ptr_eq(&person, &managed));
}

#[test]
fn unconvertible_surrogate_id_is_no_identity() {
    let resolver = MemoryResolver::new();
    let person = binder()
        .decode_instance(&json!({"_id": "seven"}), "Person", &resolver)
        .unwrap();
    assert_eq!(person.provenance(), Provenance::NewDetached);
    assert!(resolver.lookups().is_empty());
}

#[test]
fn application_identity_reads_key_field() {
    let mut resolver = MemoryResolver::new();
    let managed = Instance::attached(schema("Book"), None);
    managed.set_named("isbn", Value::from("978-0")).unwrap();
    managed.set_named("title", Value::from("Old title")).unwrap();
    resolver.manage(managed.clone());

    let book = binder()
        .decode_instance(&json!({"isbn": "978-0", "title": "New title"}), "Book", &resolver)
        .unwrap();
    assert!(std::sync::Arc::ptr_eq(&book, &managed));
    assert_eq!(book.get_named("title"), Some(Value::from("New title")));
    assert_eq!(
        resolver.dirty(),
        vec![("Book".to_string(), 0), ("Book".to_string(), 1)]
    );
}

#[test]
fn out_of_range_key_is_no_identity() {
    let mut resolver = MemoryResolver::new();
    let wrapped = Instance::attached(schema("Badge"), None);
    wrapped.set_named("code", Value::Byte(44)).unwrap();
    resolver.manage(wrapped.clone());

    let badge = binder()
        .decode_instance(&json!({"code": 300, "label": "gold"}), "Badge", &resolver)
        .unwrap();
    assert_eq!(badge.provenance(), Provenance::NewDetached);
    assert!(!std::sync::Arc::ptr_eq(&badge, &wrapped));
    assert!(resolver.lookups().is_empty());
    assert!(resolver.dirty().is_empty());
}

#[test]
fn composite_identity_is_unsupported() {
    let err = binder()
        .decode(&json!({"class": "Pair", "left": 1, "right": 2}), "Pair", &DetachedResolver)
        .unwrap_err();
    assert!(matches!(
        err,
        BindError::UnsupportedIdentityShape { ref type_name, key_fields: 2 } if type_name == "Pair"
    ));
}

#[test]
fn version_is_stored_verbatim() {
    let person = binder()
        .decode_instance(
            &json!({"class": "Person", "_version": {"seq": 3, "tag": "a"}}),
            "Person",
            &DetachedResolver,
        )
        .unwrap();
    assert_eq!(person.version(), Some(json!({"seq": 3, "tag": "a"})));
}

// ── Partial update ───────────────────────────────────────────────

#[test]
fn partial_update_merges_present_fields_only() {
    let mut resolver = MemoryResolver::new();
    let managed = resolver.manage_surrogate(schema("Person"), 7);
    managed.set_named("name", Value::from("Old")).unwrap();
    managed.set_named("age", Value::Int(40)).unwrap();
    let friend = Instance::new_detached(schema("Person"));
    managed.set_named("bestFriend", Value::Object(friend.clone())).unwrap();

    binder()
        .decode(
            &json!({"class": "Person", "_id": 7, "name": "Ann", "bestFriend": null}),
            "Person",
            &resolver,
        )
        .unwrap();

    assert_eq!(managed.get_named("name"), Some(Value::from("Ann")));
    assert_eq!(managed.get_named("age"), Some(Value::Int(40)));
    assert_eq!(managed.get_named("bestFriend"), Some(Value::Null));
    assert_eq!(
        resolver.dirty(),
        vec![("Person".to_string(), 0), ("Person".to_string(), 2)]
    );
}

#[test]
fn person_with_detached_best_friend() {
    let mut resolver = MemoryResolver::new();
    let managed = resolver.manage_surrogate(schema("Person"), 7);

    let person = binder()
        .decode_instance(
            &json!({
                "class": "Person",
                "_id": 7,
                "name": "Ann",
                "bestFriend": {"class": "Person", "_id": 9, "name": "Bo"}
            }),
            "Person",
            &resolver,
        )
        .unwrap();

    assert!(std::sync::Arc::ptr_eq(&person, &managed));
    assert_eq!(person.provenance(), Provenance::AttachedExisting);
    assert_eq!(person.get_named("name"), Some(Value::from("Ann")));

    let friend = person.get_named("bestFriend").unwrap();
    let friend = friend.as_instance().unwrap();
    assert_eq!(friend.provenance(), Provenance::NewDetached);
    assert_eq!(friend.get_named("name"), Some(Value::from("Bo")));
    assert_eq!(
        resolver.lookups(),
        vec![Identity::surrogate("Person", 7), Identity::surrogate("Person", 9)]
    );
    assert_eq!(
        resolver.dirty(),
        vec![("Person".to_string(), 0), ("Person".to_string(), 2)]
    );
}

#[test]
fn failed_merge_leaves_managed_instance_untouched() {
    let mut resolver = MemoryResolver::new();
    let managed = resolver.manage_surrogate(schema("Person"), 7);
    managed.set_named("name", Value::from("Old")).unwrap();
    managed.set_named("age", Value::Int(40)).unwrap();

    let result = binder().decode(
        &json!({"class": "Person", "_id": 7, "name": "New", "age": "not-a-number"}),
        "Person",
        &resolver,
    );

    assert!(matches!(result, Err(BindError::Conversion { .. })));
    assert_eq!(managed.get_named("name"), Some(Value::from("Old")));
    assert_eq!(managed.get_named("age"), Some(Value::Int(40)));
    assert!(resolver.dirty().is_empty());
}

// ── Scalars ──────────────────────────────────────────────────────

#[test]
fn scalar_conversions() {
    let reading = binder()
        .decode_instance(
            &json!({
                "flag": "true",
                "octet": "A",
                "letter": "xyz",
                "small": 70000,
                "count": 3.9,
                "total": "12",
                "ratio": 0.5,
                "precise": "2.25",
                "label": 42
            }),
            "Reading",
            &DetachedResolver,
        )
        .unwrap();
    assert_eq!(
        reading.values(),
        vec![
            Value::Boolean(true),
            Value::Byte(65),
            Value::Char('x'),
            Value::Short(70000_i64 as i16),
            Value::Int(3),
            Value::Long(12),
            Value::Float(0.5),
            Value::Double(2.25),
            Value::from("42"),
        ]
    );
}

#[test]
fn float_literals_saturate_at_int_range() {
    let reading = binder()
        .decode_instance(
            &json!({"small": 3e9, "count": 3e9, "total": -1e30}),
            "Reading",
            &DetachedResolver,
        )
        .unwrap();
    assert_eq!(reading.get_named("count"), Some(Value::Int(i32::MAX)));
    assert_eq!(reading.get_named("small"), Some(Value::Short(i32::MAX as i16)));
    assert_eq!(reading.get_named("total"), Some(Value::Long(i64::MIN)));

    let reading = binder()
        .decode_instance(&json!({"count": "-3e9"}), "Reading", &DetachedResolver)
        .unwrap();
    assert_eq!(reading.get_named("count"), Some(Value::Int(i32::MIN)));
}

#[test]
fn unconvertible_scalar_reports_path() {
    let err = binder()
        .decode(&json!({"count": "many"}), "Reading", &DetachedResolver)
        .unwrap_err();
    match err {
        BindError::Conversion { path, target, .. } => {
            assert_eq!(path.to_string(), "Reading.count");
            assert_eq!(target, "int");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn object_where_scalar_expected_is_shape_mismatch() {
    let err = binder()
        .decode(&json!({"name": {"first": "Ann"}}), "Person", &DetachedResolver)
        .unwrap_err();
    assert!(matches!(err, BindError::ShapeMismatch { expected: "string", found: "object", .. }));
}

// ── Relations ────────────────────────────────────────────────────

#[test]
fn reference_must_be_object() {
    let err = binder()
        .decode(&json!({"bestFriend": 9}), "Person", &DetachedResolver)
        .unwrap_err();
    match err {
        BindError::ShapeMismatch { path, expected, found } => {
            assert_eq!(path.to_string(), "Person.bestFriend");
            assert_eq!((expected, found), ("object", "number"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn nesting_beyond_max_depth_is_rejected() {
    let config = BinderConfig {
        max_depth: Some(1),
        cycle_guard: false,
    };
    let err = binder()
        .with_config(config)
        .decode(
            &json!({
                "name": "Ann",
                "bestFriend": {"name": "Bo", "bestFriend": {"name": "Cy", "bestFriend": {"name": "Di"}}}
            }),
            "Person",
            &DetachedResolver,
        )
        .unwrap_err();
    match err {
        BindError::DepthExceeded { path, max_depth } => {
            assert_eq!(path.to_string(), "Person.bestFriend.bestFriend");
            assert_eq!(max_depth, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn nesting_within_max_depth_decodes() {
    let config = BinderConfig {
        max_depth: Some(1),
        cycle_guard: false,
    };
    let person = binder()
        .with_config(config)
        .decode_instance(
            &json!({"name": "Ann", "bestFriend": {"name": "Bo"}}),
            "Person",
            &DetachedResolver,
        )
        .unwrap();
    let friend = person.get_named("bestFriend").unwrap();
    assert_eq!(friend.as_instance().unwrap().get_named("name"), Some(Value::from("Bo")));
}

#[test]
fn ordered_collection_keeps_order_and_resolves_elements() {
    let mut resolver = MemoryResolver::new();
    let managed = resolver.manage_surrogate(schema("Person"), 3);

    let person = binder()
        .decode_instance(
            &json!({"friends": [{"name": "Bo"}, {"_id": 3}, {"name": "Cy"}]}),
            "Person",
            &resolver,
        )
        .unwrap();
    let friends = person.get_named("friends").unwrap();
    let friends = friends.elements().unwrap();
    assert_eq!(friends.len(), 3);
    assert_eq!(friends[0].as_instance().unwrap().get_named("name"), Some(Value::from("Bo")));
    assert!(std::sync::Arc::ptr_eq(friends[1].as_instance().unwrap(), &managed));
    assert_eq!(friends[2].as_instance().unwrap().get_named("name"), Some(Value::from("Cy")));
}

#[test]
fn unordered_collection_drops_duplicates() {
    let library = binder()
        .decode_instance(&json!({"tags": ["b", "a", "b", "c", "a"]}), "Library", &DetachedResolver)
        .unwrap();
    assert_eq!(
        library.get_named("tags"),
        Some(Value::Set(vec![Value::from("b"), Value::from("a"), Value::from("c")]))
    );
}

#[test]
fn array_keeps_exact_length_and_order() {
    let library = binder()
        .decode_instance(&json!({"scores": [3, 1, 2, 1]}), "Library", &DetachedResolver)
        .unwrap();
    assert_eq!(
        library.get_named("scores"),
        Some(Value::Array(vec![Value::Int(3), Value::Int(1), Value::Int(2), Value::Int(1)]))
    );
}

#[test]
fn list_element_error_reports_index() {
    let err = binder()
        .decode(&json!({"scores": [1, "x"]}), "Library", &DetachedResolver)
        .unwrap_err();
    match err {
        BindError::Conversion { path, .. } => assert_eq!(path.to_string(), "Library.scores[1]"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn collection_requires_list() {
    let err = binder()
        .decode(&json!({"tags": "a"}), "Library", &DetachedResolver)
        .unwrap_err();
    assert!(matches!(err, BindError::ShapeMismatch { expected: "list", found: "string", .. }));
}

// ── Maps ─────────────────────────────────────────────────────────

#[test]
fn map_decodes_every_pair() {
    let library = binder()
        .decode_instance(
            &json!({"counts": [
                {"key": 1, "value": 10},
                {"key": 2, "value": 20},
                {"key": 3, "value": 30}
            ]}),
            "Library",
            &DetachedResolver,
        )
        .unwrap();
    assert_eq!(
        library.get_named("counts"),
        Some(Value::Map(vec![
            (Value::Int(1), Value::Long(10)),
            (Value::Int(2), Value::Long(20)),
            (Value::Int(3), Value::Long(30)),
        ]))
    );
}

#[test]
fn map_accepts_object_form_with_modeled_values() {
    let library = binder()
        .decode_instance(
            &json!({"shelves": {"a": {"isbn": "1"}, "b": {"isbn": "2"}}}),
            "Library",
            &DetachedResolver,
        )
        .unwrap();
    let Some(Value::Map(entries)) = library.get_named("shelves") else {
        panic!("expected a map");
    };
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, Value::from("a"));
    let book = entries[1].1.as_instance().unwrap();
    assert_eq!(book.get_named("isbn"), Some(Value::from("2")));
}

#[test]
fn map_later_duplicate_key_wins() {
    let library = binder()
        .decode_instance(
            &json!({"counts": [{"key": 1, "value": 10}, {"key": 1, "value": 11}]}),
            "Library",
            &DetachedResolver,
        )
        .unwrap();
    assert_eq!(
        library.get_named("counts"),
        Some(Value::Map(vec![(Value::Int(1), Value::Long(11))]))
    );
}

#[test]
fn malformed_map_entry_is_shape_mismatch() {
    let err = binder()
        .decode(&json!({"counts": [{"value": 10}]}), "Library", &DetachedResolver)
        .unwrap_err();
    match err {
        BindError::ShapeMismatch { path, expected, .. } => {
            assert_eq!(path.to_string(), "Library.counts[0]");
            assert_eq!(expected, "key/value pair");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ── Unmodeled types ──────────────────────────────────────────────

#[test]
fn generic_construction_assigns_members() {
    let resolver = MemoryResolver::new().with_template(point_template());
    let value = binder()
        .decode(&json!({"class": "Point", "x": 1}), "Point", &resolver)
        .unwrap();
    let record = value.as_record().unwrap();
    assert_eq!(record.type_name(), "Point");
    assert_eq!(record.get("x"), Some(&Value::Int(1)));
    assert_eq!(record.get("y"), Some(&Value::Int(0)));
}

#[test]
fn generic_construction_skips_bad_members() {
    let resolver = MemoryResolver::new().with_template(point_template());
    let library = binder()
        .decode_instance(
            &json!({"location": {"x": "oops", "y": 4, "z": 9}}),
            "Library",
            &resolver,
        )
        .unwrap();
    let location = library.get_named("location").unwrap();
    let record = location.as_record().unwrap();
    assert_eq!(record.get("x"), Some(&Value::Int(0)));
    assert_eq!(record.get("y"), Some(&Value::Int(4)));
    assert_eq!(record.get("z"), None);
}

#[test]
fn detached_resolver_builds_open_records() {
    let value = binder()
        .decode(&json!({"class": "Gadget", "size": 2, "name": "g", "parts": [1, 2]}), "Gadget", &DetachedResolver)
        .unwrap();
    let record = value.as_record().unwrap();
    assert!(record.is_open());
    assert_eq!(record.get("size"), Some(&Value::Long(2)));
    assert_eq!(record.get("name"), Some(&Value::from("g")));
    assert_eq!(
        record.get("parts"),
        Some(&Value::List(vec![Value::Long(1), Value::Long(2)]))
    );
}

#[test]
fn unmaterializable_type_is_unresolved() {
    let err = binder()
        .decode(&json!({"class": "Ghost"}), "Ghost", &MemoryResolver::new())
        .unwrap_err();
    assert!(matches!(err, BindError::UnresolvedType { ref type_name, .. } if type_name == "Ghost"));
}

#[test]
fn key_path_handler_decodes_nested_parents() {
    let library = binder()
        .decode_instance(
            &json!({"key": {"kind": "Task", "id": 42, "parent": {"kind": "Project", "name": "alpha"}}}),
            "Library",
            &DetachedResolver,
        )
        .unwrap();
    let key = library.get_named("key").unwrap();
    let key = key.as_record().unwrap();

    let mut parent = KeyPathHandler::record();
    parent.set("kind", Value::from("Project")).unwrap();
    parent.set("name", Value::from("alpha")).unwrap();
    let mut expected = KeyPathHandler::record();
    expected.set("kind", Value::from("Task")).unwrap();
    expected.set("id", Value::Long(42)).unwrap();
    expected.set("parent", Value::Record(parent)).unwrap();

    assert_eq!(key, &expected);
}

#[test]
fn key_path_without_id_or_name_is_handler_error() {
    let err = binder()
        .decode(&json!({"key": {"kind": "Task"}}), "Library", &DetachedResolver)
        .unwrap_err();
    match err {
        BindError::Handler { type_name, path, .. } => {
            assert_eq!(type_name, "KeyPath");
            assert_eq!(path.to_string(), "Library.key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn modeled_type_rejects_non_object_document() {
    let err = binder()
        .decode(&json!("Ann"), "Person", &DetachedResolver)
        .unwrap_err();
    assert!(matches!(err, BindError::ShapeMismatch { expected: "object", .. }));
}

#[test]
fn decoded_record_is_independent_of_template() {
    let resolver = MemoryResolver::new().with_template(point_template());
    binder()
        .decode(&json!({"class": "Point", "x": 5}), "Point", &resolver)
        .unwrap();
    let again = binder()
        .decode(&json!({"class": "Point"}), "Point", &resolver)
        .unwrap();
    assert_eq!(again, Value::Record(point_template()));
}
