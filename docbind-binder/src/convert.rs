//! Literal conversions between document values and scalar field values.
//!
//! Numeric targets narrow and widen the way fixed-width integer casts do:
//! wide integers wrap to the target width, floating point input truncates
//! toward zero and saturates at the `int` range (or the `long` range for
//! `long` fields). A string assigned to a `byte` or `char` field contributes
//! only its first code unit.
//!
//! Identity keys use the stricter [`key_scalar`].

use docbind_model::{Document, KeyValue, ScalarKind, SurrogateType, Value, shape_of};
use serde_json::Number;

use crate::error::{BindError, BindResult, FieldPath};

/// Converts a non-null document literal to a scalar of `kind`.
pub fn to_scalar(kind: ScalarKind, document: &Document, path: &FieldPath) -> BindResult<Value> {
    if matches!(document, Document::Array(_) | Document::Object(_)) {
        return Err(BindError::shape(path, kind.type_name(), shape_of(document)));
    }
    let fail = || BindError::conversion(path, kind, document);

    let value = match kind {
        ScalarKind::Boolean => match document {
            Document::Bool(b) => Value::Boolean(*b),
            Document::String(s) if s.eq_ignore_ascii_case("true") => Value::Boolean(true),
            Document::String(s) if s.eq_ignore_ascii_case("false") => Value::Boolean(false),
            _ => return Err(fail()),
        },
        ScalarKind::Byte => match document {
            Document::String(s) => Value::Byte(s.bytes().next().map_or(0, |b| b as i8)),
            _ => Value::Byte(integral(document, |n| n as i8, |f| f as i32 as i8).ok_or_else(fail)?),
        },
        ScalarKind::Char => match document {
            Document::String(s) => Value::Char(s.chars().next().unwrap_or('\0')),
            _ => {
                let code = integral(document, |n| n, |f| f as i64).ok_or_else(fail)?;
                let c = u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(fail)?;
                Value::Char(c)
            }
        },
        ScalarKind::Short => {
            Value::Short(integral(document, |n| n as i16, |f| f as i32 as i16).ok_or_else(fail)?)
        }
        ScalarKind::Int => Value::Int(integral(document, |n| n as i32, |f| f as i32).ok_or_else(fail)?),
        ScalarKind::Long => Value::Long(integral(document, |n| n, |f| f as i64).ok_or_else(fail)?),
        ScalarKind::Float => Value::Float(floating(document).ok_or_else(fail)? as f32),
        ScalarKind::Double => Value::Double(floating(document).ok_or_else(fail)?),
        ScalarKind::String => match document {
            Document::String(s) => Value::String(s.clone()),
            Document::Number(n) => Value::String(n.to_string()),
            Document::Bool(b) => Value::String(b.to_string()),
            _ => return Err(fail()),
        },
    };
    Ok(value)
}

/// Reads an integral literal: integers go through `wrap`, anything with a
/// fraction or exponent through `truncate`.
fn integral<T>(document: &Document, wrap: impl Fn(i64) -> T, truncate: impl Fn(f64) -> T) -> Option<T> {
    match document {
        Document::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| u as i64))
            .map(&wrap)
            .or_else(|| n.as_f64().map(&truncate)),
        Document::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().map(&wrap).or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(&truncate)
            })
        }
        _ => None,
    }
}

/// Converts a literal to the value of an identity key field of `kind`.
///
/// Unlike [`to_scalar`] nothing narrows: an integral key must be an integer
/// that fits the key width, and a `char` key given as a string must be
/// exactly one character.
pub fn key_scalar(kind: ScalarKind, document: &Document, path: &FieldPath) -> BindResult<Value> {
    let fail = || BindError::conversion(path, kind, document);
    match kind {
        ScalarKind::Byte | ScalarKind::Short | ScalarKind::Int | ScalarKind::Long => {
            let n = exact_integer(document).ok_or_else(fail)?;
            let value = match kind {
                ScalarKind::Byte => i8::try_from(n).ok().map(Value::Byte),
                ScalarKind::Short => i16::try_from(n).ok().map(Value::Short),
                ScalarKind::Int => i32::try_from(n).ok().map(Value::Int),
                _ => Some(Value::Long(n)),
            };
            value.ok_or_else(fail)
        }
        ScalarKind::Char => match document {
            Document::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(fail()),
                }
            }
            _ => to_scalar(kind, document, path),
        },
        _ => to_scalar(kind, document, path),
    }
}

fn exact_integer(document: &Document) -> Option<i64> {
    match document {
        Document::Number(n) => n.as_i64(),
        Document::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn floating(document: &Document) -> Option<f64> {
    match document {
        Document::Number(n) => n.as_f64(),
        Document::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Converts a scalar value to its document literal.
///
/// Returns `None` for non-scalar values and for non-finite floating point
/// numbers, which have no document form.
pub fn from_scalar(value: &Value) -> Option<Document> {
    let document = match value {
        Value::Boolean(b) => Document::Bool(*b),
        Value::Byte(n) => Document::from(*n),
        Value::Short(n) => Document::from(*n),
        Value::Int(n) => Document::from(*n),
        Value::Long(n) => Document::from(*n),
        Value::Float(n) => Document::Number(Number::from_f64(f64::from(*n))?),
        Value::Double(n) => Document::Number(Number::from_f64(*n)?),
        Value::Char(c) => Document::String(c.to_string()),
        Value::String(s) => Document::String(s.clone()),
        _ => return None,
    };
    Some(document)
}

/// Converts a document with no declared target type.
///
/// Integers become `Long`, other numbers `Double`; nested objects are kept
/// as opaque documents.
pub fn untyped(document: &Document) -> Value {
    match document {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Boolean(*b),
        Document::Number(n) => match n.as_i64() {
            Some(i) => Value::Long(i),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Document::String(s) => Value::String(s.clone()),
        Document::Array(items) => Value::List(items.iter().map(untyped).collect()),
        Document::Object(_) => Value::Document(document.clone()),
    }
}

/// Reads a surrogate identity value. Returns `None` when it does not convert.
pub fn surrogate_key(value_type: SurrogateType, document: &Document) -> Option<KeyValue> {
    match (value_type, document) {
        (SurrogateType::Integer, Document::Number(n)) => n.as_i64().map(KeyValue::Integer),
        (SurrogateType::Integer, Document::String(s)) => KeyValue::parse_integer(s).ok(),
        (SurrogateType::String, Document::String(s)) => Some(KeyValue::Text(s.clone())),
        (SurrogateType::String, Document::Number(n)) => Some(KeyValue::Text(n.to_string())),
        _ => None,
    }
}
