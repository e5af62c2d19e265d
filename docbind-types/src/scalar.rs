//! Literal field types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The literal type of a scalar field.
///
/// Widths follow the usual fixed-size integer family: `Byte` is 8 bits,
/// `Short` 16, `Int` 32, `Long` 64. `Char` holds a single code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 9] = [
        ScalarKind::Boolean,
        ScalarKind::Byte,
        ScalarKind::Char,
        ScalarKind::Short,
        ScalarKind::Int,
        ScalarKind::Long,
        ScalarKind::Float,
        ScalarKind::Double,
        ScalarKind::String,
    ];

    /// Canonical type name, as used for collection element and map key/value types.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            ScalarKind::Boolean => "boolean",
            ScalarKind::Byte => "byte",
            ScalarKind::Char => "char",
            ScalarKind::Short => "short",
            ScalarKind::Int => "int",
            ScalarKind::Long => "long",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
        }
    }

    /// Resolves a declared type name to a scalar kind, if it names one.
    ///
    /// Accepts the canonical names plus the boxed spellings (`Integer`,
    /// `Boolean`, `Character`, `String`, ...) case-insensitively.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => ScalarKind::Boolean,
            "byte" | "i8" => ScalarKind::Byte,
            "char" | "character" => ScalarKind::Char,
            "short" | "i16" => ScalarKind::Short,
            "int" | "integer" | "i32" => ScalarKind::Int,
            "long" | "i64" => ScalarKind::Long,
            "float" | "f32" => ScalarKind::Float,
            "double" | "f64" => ScalarKind::Double,
            "string" | "str" => ScalarKind::String,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether a missing value of this kind is represented as null rather than a zero value.
    #[must_use]
    pub const fn is_string_like(self) -> bool {
        matches!(self, ScalarKind::String)
    }

    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            ScalarKind::Byte | ScalarKind::Short | ScalarKind::Int | ScalarKind::Long
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ScalarKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_type_name(s).ok_or_else(|| Error::UnknownScalarKind(s.to_string()))
    }
}
