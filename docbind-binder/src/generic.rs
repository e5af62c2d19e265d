//! Construction of values for types with neither a schema nor a handler.

use docbind_model::{CLASS_KEY, Document, DocumentMap, Record, Value};
use tracing::warn;

use crate::convert::{to_scalar, untyped};
use crate::error::{BindError, BindResult, FieldPath};
use crate::resolver::ObjectResolver;

/// Builds a record of `type_name` by assigning document keys to same-named members.
///
/// Assignment is best effort: a key with no matching member or an
/// unconvertible value is logged and skipped, and the remaining keys are
/// still assigned.
pub fn construct(
    resolver: &dyn ObjectResolver,
    map: &DocumentMap,
    type_name: &str,
    path: &FieldPath,
) -> BindResult<Record> {
    let Some(mut record) = resolver.materialize_new(type_name) else {
        return Err(BindError::UnresolvedType {
            type_name: type_name.to_string(),
            path: path.clone(),
        });
    };

    for (name, document) in map {
        if name == CLASS_KEY {
            continue;
        }
        if let Err(e) = assign(&mut record, name, document, path) {
            warn!(type_name, member = %name, error = %e, "Skipping member during generic construction");
        }
    }
    Ok(record)
}

fn assign(
    record: &mut Record,
    name: &str,
    document: &Document,
    path: &FieldPath,
) -> BindResult<()> {
    let value = match record.member_kind(name)? {
        _ if document.is_null() => Value::Null,
        Some(kind) => {
            let mut member_path = path.clone();
            member_path.push_field(name);
            to_scalar(kind, document, &member_path)?
        }
        None => untyped(document),
    };
    record.set(name, value)?;
    Ok(())
}
