//! Identity values.
//!
//! An [`Identity`] is what the binder hands to an object resolver when it
//! wants to know whether a document describes an already-managed object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Error;

/// A single hashable key value.
///
/// Floating point keys are absent: they cannot be compared for identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyValue {
    Boolean(bool),
    Integer(i64),
    Char(char),
    Text(String),
}

impl KeyValue {
    /// Parses a decimal integer key.
    pub fn parse_integer(s: &str) -> Result<Self, Error> {
        s.trim()
            .parse::<i64>()
            .map(KeyValue::Integer)
            .map_err(|_| Error::InvalidKey {
                kind: "integer",
                input: s.to_string(),
            })
    }

    /// Returns the document form of this key.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            KeyValue::Boolean(b) => serde_json::Value::Bool(*b),
            KeyValue::Integer(n) => serde_json::Value::from(*n),
            KeyValue::Char(c) => serde_json::Value::String(c.to_string()),
            KeyValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            KeyValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Boolean(b) => write!(f, "{b}"),
            KeyValue::Integer(n) => write!(f, "{n}"),
            KeyValue::Char(c) => write!(f, "{c}"),
            KeyValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(n: i64) -> Self {
        KeyValue::Integer(n)
    }
}

impl From<i32> for KeyValue {
    fn from(n: i32) -> Self {
        KeyValue::Integer(i64::from(n))
    }
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        KeyValue::Text(s.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(s: String) -> Self {
        KeyValue::Text(s)
    }
}

/// Where an identity's key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum IdentityOrigin {
    /// System-generated value carried in the `_id` document key.
    Surrogate,
    /// Value of the single declared key field at `position`.
    Application { position: usize },
}

/// A key qualified by the type it identifies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub type_name: String,
    pub origin: IdentityOrigin,
    pub key: KeyValue,
}

impl Identity {
    #[must_use]
    pub fn surrogate(type_name: impl Into<String>, key: impl Into<KeyValue>) -> Self {
        Self {
            type_name: type_name.into(),
            origin: IdentityOrigin::Surrogate,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn application(
        type_name: impl Into<String>,
        position: usize,
        key: impl Into<KeyValue>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            origin: IdentityOrigin::Application { position },
            key: key.into(),
        }
    }

    #[must_use]
    pub fn is_surrogate(&self) -> bool {
        matches!(self.origin, IdentityOrigin::Surrogate)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name, self.key)
    }
}
