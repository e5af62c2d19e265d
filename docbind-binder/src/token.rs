//! Textual identity tokens, as carried in resource URLs.
//!
//! A token is the bare key: `42` for an integer surrogate, `ann` for a
//! string key. The schema supplies the type.

use docbind_model::{ClassSchema, Document, Identity, IdentityDescriptor, KeyValue, SurrogateType};

use crate::convert::key_scalar;
use crate::error::{BindError, BindResult, FieldPath};

/// Parses a token into an identity of `schema`'s type.
pub fn token_to_identity(token: &str, schema: &ClassSchema) -> BindResult<Identity> {
    let path = FieldPath::root(schema.type_name.as_str());
    match &schema.identity {
        IdentityDescriptor::Surrogate { value_type } => {
            let key = match value_type {
                SurrogateType::String => KeyValue::Text(token.to_string()),
                SurrogateType::Integer => KeyValue::parse_integer(token)
                    .map_err(|_| BindError::conversion(&path, "integer", format!("{token:?}")))?,
            };
            Ok(Identity::surrogate(schema.type_name.as_str(), key))
        }
        IdentityDescriptor::Application { key_positions } => match key_positions.as_slice() {
            [position] => {
                let field = schema.field_at(*position).ok_or_else(|| BindError::UnknownField {
                    type_name: schema.type_name.clone(),
                    position: *position,
                })?;
                let kind = field.kind.scalar_kind().ok_or_else(|| {
                    BindError::shape(&path, "scalar key field", "relation")
                })?;
                let mut field_path = path.clone();
                field_path.push_field(&field.name);
                let key = key_scalar(kind, &Document::String(token.to_string()), &field_path)?
                    .to_key()
                    .ok_or_else(|| BindError::conversion(&field_path, kind, format!("{token:?}")))?;
                Ok(Identity::application(schema.type_name.as_str(), *position, key))
            }
            positions => Err(BindError::UnsupportedIdentityShape {
                type_name: schema.type_name.clone(),
                key_fields: positions.len(),
            }),
        },
    }
}

/// Renders an identity as a token; the inverse of [`token_to_identity`].
pub fn identity_to_token(identity: &Identity) -> String {
    identity.key.to_string()
}
