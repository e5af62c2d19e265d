use docbind_types::ScalarKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Error, Result};

/// Describes a type's fields and identity for encoding and decoding.
///
/// Field positions are dense (`0..fields.len()`) and never change once the
/// schema is registered; instances store their values by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSchema {
    /// Fully qualified type name, written to the `class` discriminator.
    pub type_name: String,
    /// Optional short name the type can also be looked up by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    pub identity: IdentityDescriptor,
}

impl ClassSchema {
    pub fn new(type_name: impl Into<String>, identity: IdentityDescriptor) -> Self {
        Self {
            type_name: type_name.into(),
            entity_name: None,
            fields: Vec::new(),
            identity,
        }
    }

    pub fn with_entity_name(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    /// Appends a field at the next free position.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let position = self.fields.len();
        self.fields.push(FieldDescriptor {
            name: name.into(),
            position,
            kind,
        });
        self
    }

    /// Shorthand for appending a scalar field.
    pub fn scalar(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.field(name, FieldKind::Scalar { scalar: kind })
    }

    pub fn field_at(&self, position: usize) -> Option<&FieldDescriptor> {
        self.fields.get(position)
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Every field position, in declaration order.
    pub fn all_positions(&self) -> Vec<usize> {
        (0..self.fields.len()).collect()
    }

    /// The single application key field, if this type has exactly one.
    pub fn single_key_field(&self) -> Option<&FieldDescriptor> {
        match &self.identity {
            IdentityDescriptor::Application { key_positions } if key_positions.len() == 1 => {
                self.field_at(key_positions[0])
            }
            _ => None,
        }
    }

    /// Checks the dense-position invariant and the identity descriptor.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (expected, field) in self.fields.iter().enumerate() {
            if field.position != expected {
                return Err(Error::PositionMismatch {
                    type_name: self.type_name.clone(),
                    field: field.name.clone(),
                    expected,
                    actual: field.position,
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::DuplicateField {
                    type_name: self.type_name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        if let IdentityDescriptor::Application { key_positions } = &self.identity {
            if key_positions.is_empty() {
                return Err(Error::NoKeyFields {
                    type_name: self.type_name.clone(),
                });
            }
            for &position in key_positions {
                let field = self.field_at(position).ok_or_else(|| Error::KeyOutOfRange {
                    type_name: self.type_name.clone(),
                    position,
                })?;
                if field.kind.scalar_kind().is_none() {
                    return Err(Error::KeyNotScalar {
                        type_name: self.type_name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A single field of a [`ClassSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub position: usize,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// The shape of a field's value.
///
/// Type names inside relation variants are either a modeled type (one with a
/// schema), a scalar type name understood by [`ScalarKind::from_type_name`],
/// or an unmodeled value type handled by a type handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Scalar {
        scalar: ScalarKind,
    },
    /// Reference to one other object.
    SingleValued {
        target: String,
    },
    Collection {
        element: String,
        /// Ordered collections keep duplicates; unordered ones behave as sets.
        #[serde(default = "default_ordered")]
        ordered: bool,
    },
    /// Fixed-length sequence.
    Array {
        element: String,
    },
    Map {
        key: String,
        value: String,
    },
    /// Non-relation field holding a value of an unmodeled type.
    Value {
        type_name: String,
    },
}

fn default_ordered() -> bool {
    true
}

impl FieldKind {
    pub fn scalar(kind: ScalarKind) -> Self {
        FieldKind::Scalar { scalar: kind }
    }

    pub fn reference(target: impl Into<String>) -> Self {
        FieldKind::SingleValued {
            target: target.into(),
        }
    }

    pub fn list(element: impl Into<String>) -> Self {
        FieldKind::Collection {
            element: element.into(),
            ordered: true,
        }
    }

    pub fn set(element: impl Into<String>) -> Self {
        FieldKind::Collection {
            element: element.into(),
            ordered: false,
        }
    }

    pub fn array(element: impl Into<String>) -> Self {
        FieldKind::Array {
            element: element.into(),
        }
    }

    pub fn map(key: impl Into<String>, value: impl Into<String>) -> Self {
        FieldKind::Map {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn value(type_name: impl Into<String>) -> Self {
        FieldKind::Value {
            type_name: type_name.into(),
        }
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            FieldKind::Scalar { scalar } => Some(*scalar),
            _ => None,
        }
    }

    pub fn relation_kind(&self) -> RelationKind {
        match self {
            FieldKind::Scalar { .. } | FieldKind::Value { .. } => RelationKind::None,
            FieldKind::SingleValued { .. } => RelationKind::SingleValued,
            FieldKind::Collection { .. } => RelationKind::Collection,
            FieldKind::Array { .. } => RelationKind::Array,
            FieldKind::Map { .. } => RelationKind::Map,
        }
    }
}

/// Relation shape of a field, ignoring the types involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    None,
    SingleValued,
    Collection,
    Array,
    Map,
}

/// How instances of a type are identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdentityDescriptor {
    /// System-generated identity carried in the `_id` document key.
    Surrogate { value_type: SurrogateType },
    /// Identity taken from declared key fields. Only one key field is supported.
    Application { key_positions: Vec<usize> },
}

impl IdentityDescriptor {
    pub fn surrogate_integer() -> Self {
        IdentityDescriptor::Surrogate {
            value_type: SurrogateType::Integer,
        }
    }

    pub fn surrogate_string() -> Self {
        IdentityDescriptor::Surrogate {
            value_type: SurrogateType::String,
        }
    }

    pub fn application(key_positions: Vec<usize>) -> Self {
        IdentityDescriptor::Application { key_positions }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, IdentityDescriptor::Application { key_positions } if key_positions.len() > 1)
    }
}

/// Declared value type of a surrogate identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurrogateType {
    String,
    Integer,
}
