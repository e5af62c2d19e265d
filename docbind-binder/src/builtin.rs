//! Handlers registered by [`TypeHandlerRegistry::with_builtins`](crate::TypeHandlerRegistry::with_builtins).

use docbind_model::{Document, DocumentMap, Record, ScalarKind, Value};

use crate::error::{BindError, BindResult, FieldPath};
use crate::handler::{HandlerContext, TypeHandler};

/// Type name of the hierarchical key value.
pub const KEY_PATH_TYPE: &str = "KeyPath";

/// Codec for hierarchical keys: a `kind`, either a numeric `id` or a `name`,
/// and an optional `parent` key of the same shape.
///
/// ```json
/// {"kind": "Task", "id": 42, "parent": {"kind": "Project", "name": "alpha"}}
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyPathHandler;

impl KeyPathHandler {
    /// An empty key path record with all members declared.
    pub fn record() -> Record {
        Record::new(KEY_PATH_TYPE)
            .with_member("kind", Some(ScalarKind::String))
            .with_member("id", Some(ScalarKind::Long))
            .with_member("name", Some(ScalarKind::String))
            .with_member("parent", None)
    }
}

impl TypeHandler for KeyPathHandler {
    fn from_document(&self, document: &Document, ctx: &mut HandlerContext<'_, '_>) -> BindResult<Value> {
        let Some(map) = document.as_object() else {
            return Err(ctx.error(KEY_PATH_TYPE, "expected an object"));
        };
        let kind = map
            .get("kind")
            .and_then(Document::as_str)
            .ok_or_else(|| ctx.error(KEY_PATH_TYPE, "missing 'kind'"))?;

        let mut record = Self::record();
        record.set("kind", Value::from(kind))?;

        match (map.get("id"), map.get("name")) {
            (Some(Document::Number(n)), _) => {
                let id = n
                    .as_i64()
                    .ok_or_else(|| ctx.error(KEY_PATH_TYPE, format!("'id' is not an integer: {n}")))?;
                record.set("id", Value::Long(id))?;
            }
            (_, Some(Document::String(name))) => {
                record.set("name", Value::from(name.as_str()))?;
            }
            _ => return Err(ctx.error(KEY_PATH_TYPE, "needs an integer 'id' or a string 'name'")),
        }

        if let Some(parent) = map.get("parent").filter(|p| !p.is_null()) {
            let parent = ctx.decode_nested(parent, KEY_PATH_TYPE)?;
            record.set("parent", parent)?;
        }
        Ok(Value::Record(record))
    }

    fn to_document(&self, record: &Record) -> BindResult<Option<Document>> {
        key_path_document(record).map(|map| Some(Document::Object(map)))
    }
}

fn key_path_document(record: &Record) -> BindResult<DocumentMap> {
    let invalid = |message: &str| BindError::Handler {
        type_name: KEY_PATH_TYPE.to_string(),
        path: FieldPath::root(record.type_name()),
        message: message.to_string(),
    };

    let mut map = DocumentMap::new();
    let kind = record
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing 'kind'"))?;
    map.insert("kind".into(), Document::from(kind));

    match (record.get("id"), record.get("name").and_then(Value::as_str)) {
        (_, Some(name)) => {
            map.insert("name".into(), Document::from(name));
        }
        (Some(id), None) => {
            let id = id.as_i64().ok_or_else(|| invalid("'id' is not an integer"))?;
            map.insert("id".into(), Document::from(id));
        }
        (None, None) => return Err(invalid("needs an 'id' or a 'name'")),
    }

    if let Some(parent) = record.get("parent").and_then(Value::as_record) {
        map.insert("parent".into(), Document::Object(key_path_document(parent)?));
    }
    Ok(map)
}
