//! Decoded values and the record they are assembled into.

use indexmap::IndexMap;

use crate::errors::ValueError;

/// A value produced when decoding a field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    I8(i8),
    I16(i16),
    I32(i32),
    F32(f32),
    F64(f64),
    Bool(bool),
    String(String),
    /// Raw bytes, for custom parsers that pass a window through untouched.
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    /// A nested record, usually from a custom parser that decodes a sub-schema.
    Record(Record),
}

impl Value {
    /// Short name of the variant, used in projection errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::U8(_) => "uint8",
            Value::U16(_) => "uint16",
            Value::U32(_) => "uint32",
            Value::I8(_) => "int8",
            Value::I16(_) => "int16",
            Value::I32(_) => "int32",
            Value::F32(_) => "float32",
            Value::F64(_) => "float64",
            Value::Bool(_) => "boolean",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Projects this value onto `T`.
    pub fn to<T: FromValue>(&self) -> Result<T, ValueError> {
        T::from_value(self)
    }
}

/// Field name to decoded value, in the order fields were processed.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Record(IndexMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts a value, returning the previous one for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up `key` and projects it onto `T`.
    pub fn get_as<T: FromValue>(&self, key: &str) -> Result<T, ValueError> {
        let value = self
            .get(key)
            .ok_or_else(|| ValueError::MissingField(key.to_string()))?;

        T::from_value(value).map_err(|source| ValueError::Field {
            field: key.to_string(),
            source: Box::new(source),
        })
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Conversion from a decoded [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

/// Conversion from a whole decoded [`Record`] into a caller-defined type.
///
/// ```
/// use bytecraft::value::{FromRecord, Record};
/// use bytecraft::errors::ValueError;
///
/// struct Header {
///     id: u32,
///     name: String,
/// }
///
/// impl FromRecord for Header {
///     fn from_record(record: &Record) -> Result<Self, ValueError> {
///         Ok(Header {
///             id: record.get_as("id")?,
///             name: record.get_as("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self, ValueError>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> Result<Self, ValueError> {
        Ok(record.clone())
    }
}

fn mismatch(expected: &'static str, found: &Value) -> ValueError {
    ValueError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

macro_rules! from_value {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, ValueError> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(mismatch($name, other)),
                }
            }
        }
    };
}

from_value!(u8, U8, "uint8");
from_value!(u16, U16, "uint16");
from_value!(u32, U32, "uint32");
from_value!(i8, I8, "int8");
from_value!(i16, I16, "int16");
from_value!(i32, I32, "int32");
from_value!(f32, F32, "float32");
from_value!(f64, F64, "float64");
from_value!(bool, Bool, "boolean");
from_value!(String, String, "string");
from_value!(Record, Record, "record");

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Array(values) => values.iter().map(T::from_value).collect(),
            // Byte windows project element-wise, so `Vec<u8>` accepts both shapes.
            Value::Bytes(bytes) => bytes
                .iter()
                .map(|b| T::from_value(&Value::U8(*b)))
                .collect(),
            other => Err(mismatch("array", other)),
        }
    }
}
