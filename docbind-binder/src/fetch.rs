use docbind_model::ClassSchema;
use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::{BindError, BindResult};

/// Which fields to encode, per type.
///
/// The plan is owned by the caller. Types without an explicit selection
/// encode every field in declaration order. A plan must describe an acyclic
/// traversal unless the cycle guard is enabled.
#[derive(Debug, Clone, Default)]
pub struct FetchPlan {
    per_type: HashMap<String, Vec<usize>>,
}

impl FetchPlan {
    /// Selects every field of every type.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts `type_name` to the given positions, encoded in that order.
    pub fn with_fields(mut self, type_name: impl Into<String>, positions: Vec<usize>) -> Self {
        self.per_type.insert(type_name.into(), positions);
        self
    }

    /// Restricts a schema's type to the named fields.
    pub fn with_field_names(self, schema: &ClassSchema, names: &[&str]) -> BindResult<Self> {
        let positions = names
            .iter()
            .map(|name| {
                schema
                    .field_named(name)
                    .map(|f| f.position)
                    .ok_or_else(|| {
                        BindError::Model(docbind_model::Error::UnknownField {
                            type_name: schema.type_name.clone(),
                            field: (*name).to_string(),
                        })
                    })
            })
            .collect::<BindResult<Vec<_>>>()?;
        Ok(self.with_fields(schema.type_name.clone(), positions))
    }

    pub fn positions_for<'s>(&'s self, schema: &ClassSchema) -> Cow<'s, [usize]> {
        match self.per_type.get(&schema.type_name) {
            Some(positions) => Cow::Borrowed(positions.as_slice()),
            None => Cow::Owned(schema.all_positions()),
        }
    }
}
