use docbind_types::{KeyValue, ScalarKind};

use crate::{Document, Error, FieldKind, InstanceRef, Result};

/// A runtime field value.
///
/// Object references compare by identity (see [`crate::Instance`]), so
/// equality never walks into a possibly cyclic graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Reference to a schema-managed instance.
    Object(InstanceRef),
    /// Ordered collection.
    List(Vec<Value>),
    /// Unordered collection without duplicates, kept in first-insertion order.
    Set(Vec<Value>),
    /// Fixed-length sequence.
    Array(Vec<Value>),
    /// Map entries in insertion order.
    Map(Vec<(Value, Value)>),
    /// Generically constructed value of an unmodeled type.
    Record(Record),
    /// Untyped nested document carried as-is.
    Document(Document),
}

impl Value {
    /// Zero value of a scalar kind. Strings default to null.
    pub fn default_scalar(kind: ScalarKind) -> Value {
        match kind {
            ScalarKind::Boolean => Value::Boolean(false),
            ScalarKind::Byte => Value::Byte(0),
            ScalarKind::Char => Value::Char('\0'),
            ScalarKind::Short => Value::Short(0),
            ScalarKind::Int => Value::Int(0),
            ScalarKind::Long => Value::Long(0),
            ScalarKind::Float => Value::Float(0.0),
            ScalarKind::Double => Value::Double(0.0),
            ScalarKind::String => Value::Null,
        }
    }

    /// Value a freshly constructed instance holds for a field of this kind.
    pub fn default_for(kind: &FieldKind) -> Value {
        match kind {
            FieldKind::Scalar { scalar } => Value::default_scalar(*scalar),
            _ => Value::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The scalar kind of a literal value, or `None` for null and structured values.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        let kind = match self {
            Value::Boolean(_) => ScalarKind::Boolean,
            Value::Byte(_) => ScalarKind::Byte,
            Value::Char(_) => ScalarKind::Char,
            Value::Short(_) => ScalarKind::Short,
            Value::Int(_) => ScalarKind::Int,
            Value::Long(_) => ScalarKind::Long,
            Value::Float(_) => ScalarKind::Float,
            Value::Double(_) => ScalarKind::Double,
            Value::String(_) => ScalarKind::String,
            _ => return None,
        };
        Some(kind)
    }

    /// Short name of this value's shape, for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Document(_) => "document",
            scalar => scalar.scalar_kind().map_or("scalar", ScalarKind::type_name),
        }
    }

    pub fn as_instance(&self) -> Option<&InstanceRef> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Widens any integral value to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(n) => Some(i64::from(*n)),
            Value::Short(n) => Some(i64::from(*n)),
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(f64::from(*n)),
            Value::Double(n) => Some(*n),
            other => other.as_i64().map(|n| n as f64),
        }
    }

    /// Elements of a list, set or array.
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) | Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Converts a literal into an identity key. Floating point values have no key form.
    pub fn to_key(&self) -> Option<KeyValue> {
        match self {
            Value::Boolean(b) => Some(KeyValue::Boolean(*b)),
            Value::Char(c) => Some(KeyValue::Char(*c)),
            Value::String(s) => Some(KeyValue::Text(s.clone())),
            other => other.as_i64().map(KeyValue::Integer),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<InstanceRef> for Value {
    fn from(instance: InstanceRef) -> Self {
        Value::Object(instance)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<KeyValue> for Value {
    fn from(key: KeyValue) -> Self {
        match key {
            KeyValue::Boolean(b) => Value::Boolean(b),
            KeyValue::Integer(n) => Value::Long(n),
            KeyValue::Char(c) => Value::Char(c),
            KeyValue::Text(s) => Value::String(s),
        }
    }
}

/// A public member of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    /// Declared literal type, or `None` for a member that accepts any value.
    pub kind: Option<ScalarKind>,
    pub value: Value,
}

/// A value of a type the schema set does not model.
///
/// Records are what generic construction produces: an empty value of the
/// target type whose public members are then assigned by name. A *closed*
/// record only accepts its declared members; an *open* record accepts any
/// member name.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    open: bool,
    members: Vec<Member>,
}

impl Record {
    /// Creates a closed record with no members.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            open: false,
            members: Vec::new(),
        }
    }

    /// Creates a record that accepts members of any name.
    pub fn open(type_name: impl Into<String>) -> Self {
        Self {
            open: true,
            ..Self::new(type_name)
        }
    }

    /// Declares a member, initialised to the zero value of its kind.
    pub fn with_member(mut self, name: impl Into<String>, kind: Option<ScalarKind>) -> Self {
        self.members.push(Member {
            name: name.into(),
            kind,
            value: kind.map_or(Value::Null, Value::default_scalar),
        });
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.iter().find(|m| m.name == name).map(|m| &m.value)
    }

    /// Declared kind of a member, or an error if the record has no such member.
    ///
    /// Open records report undeclared members as untyped.
    pub fn member_kind(&self, name: &str) -> Result<Option<ScalarKind>> {
        match self.members.iter().find(|m| m.name == name) {
            Some(member) => Ok(member.kind),
            None if self.open => Ok(None),
            None => Err(Error::NoSuchMember {
                type_name: self.type_name.clone(),
                member: name.to_string(),
            }),
        }
    }

    /// Sets a member by name. Open records append unknown members.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        if let Some(member) = self.members.iter_mut().find(|m| m.name == name) {
            member.value = value;
            return Ok(());
        }
        if !self.open {
            return Err(Error::NoSuchMember {
                type_name: self.type_name.clone(),
                member: name.to_string(),
            });
        }
        self.members.push(Member {
            name: name.to_string(),
            kind: None,
            value,
        });
        Ok(())
    }
}
