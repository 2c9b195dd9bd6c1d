//! Definition of the fields used to build a [crate::schema::Schema].

use std::{fmt, str::FromStr, sync::Arc};

use crate::{
    bytes::{ByteReader, Endian},
    decoder::{self, DecodeOptions, Decoded},
    errors::{DecodeError, SchemaError},
    order::Order,
    value::{Record, Value},
};

/// Element type of a scalar or array field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Uint8,
    Uint16,
    Uint32,
    Int8,
    Int16,
    Int32,
    Float32,
    Float64,
    /// One byte per character; the width of the field is the string length.
    String,
    /// One byte, true iff nonzero.
    Boolean,
}

impl ScalarType {
    /// Canonical width in bytes of one element.
    pub fn width(self) -> usize {
        match self {
            ScalarType::Uint8 | ScalarType::Int8 => 1,
            ScalarType::Uint16 | ScalarType::Int16 => 2,
            ScalarType::Uint32 | ScalarType::Int32 | ScalarType::Float32 => 4,
            ScalarType::Float64 => 8,
            ScalarType::String | ScalarType::Boolean => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Uint8 => "uint8",
            ScalarType::Uint16 => "uint16",
            ScalarType::Uint32 => "uint32",
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::String => "string",
            ScalarType::Boolean => "boolean",
        }
    }
}

impl FromStr for ScalarType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "uint8" => ScalarType::Uint8,
            "uint16" => ScalarType::Uint16,
            "uint32" => ScalarType::Uint32,
            "int8" => ScalarType::Int8,
            "int16" => ScalarType::Int16,
            "int32" => ScalarType::Int32,
            "float32" => ScalarType::Float32,
            "float64" => ScalarType::Float64,
            "string" => ScalarType::String,
            "boolean" => ScalarType::Boolean,
            other => return Err(SchemaError::UnknownType(other.to_string())),
        })
    }
}

/// What a field decodes to.
#[derive(Clone)]
pub enum FieldType {
    /// A single value.
    Scalar(ScalarType),
    /// `count` values of the element type laid out back to back.
    Array(ScalarType),
    /// Decoded by a caller-supplied parser.
    Custom(Arc<dyn CustomParse>),
}

impl FieldType {
    /// Wraps a closure as a custom field type.
    pub fn custom<F>(parser: F) -> Self
    where
        F: Fn(&ByteReader<'_>, &ParseDetails<'_>) -> Result<Parsed, DecodeError>
            + Send
            + Sync
            + 'static,
    {
        FieldType::Custom(Arc::new(parser))
    }

    /// Parses a built-in type name such as `"uint16"` or `"string[]"`.
    ///
    /// `"custom"` is rejected because a name alone cannot carry a parser.
    pub fn from_name(name: &str) -> Result<Self, SchemaError> {
        match name.strip_suffix("[]") {
            Some(element) => Ok(FieldType::Array(element.parse()?)),
            None if name == "custom" => Err(SchemaError::MissingParser(name.to_string())),
            None => Ok(FieldType::Scalar(name.parse()?)),
        }
    }

    /// Default width of one element: the type's canonical width, 0 for custom.
    pub fn width(&self) -> usize {
        match self {
            FieldType::Scalar(ty) | FieldType::Array(ty) => ty.width(),
            FieldType::Custom(_) => 0,
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(ty) => write!(f, "{}", ty.name()),
            FieldType::Array(ty) => write!(f, "{}[]", ty.name()),
            FieldType::Custom(_) => f.write_str("custom"),
        }
    }
}

/// Width of one element, or per-element widths for heterogeneous string arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ByteWidth {
    Uniform(usize),
    PerElement(Vec<usize>),
}

impl From<usize> for ByteWidth {
    fn from(value: usize) -> Self {
        ByteWidth::Uniform(value)
    }
}

impl From<Vec<usize>> for ByteWidth {
    fn from(value: Vec<usize>) -> Self {
        ByteWidth::PerElement(value)
    }
}

impl<const N: usize> From<[usize; N]> for ByteWidth {
    fn from(value: [usize; N]) -> Self {
        ByteWidth::PerElement(value.to_vec())
    }
}

/// One field of a schema. Unset options fall back to the call defaults.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub kind: FieldType,
    /// Absolute start offset. Defaults to the running cursor.
    pub offset: Option<usize>,
    /// Element width. Defaults to [FieldType::width].
    pub byte: Option<ByteWidth>,
    /// Element count. Defaults to 1.
    pub count: Option<usize>,
    /// Byte order. Defaults to the call's endianness.
    pub endian: Option<Endian>,
    /// Processing order hint.
    pub order: Option<Order>,
}

impl SchemaEntry {
    pub fn new(kind: FieldType) -> Self {
        Self {
            kind,
            offset: None,
            byte: None,
            count: None,
            endian: None,
            order: None,
        }
    }

    pub fn scalar(ty: ScalarType) -> Self {
        Self::new(FieldType::Scalar(ty))
    }

    pub fn array(ty: ScalarType, count: usize) -> Self {
        Self::new(FieldType::Array(ty)).count(count)
    }

    pub fn custom<F>(parser: F) -> Self
    where
        F: Fn(&ByteReader<'_>, &ParseDetails<'_>) -> Result<Parsed, DecodeError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(FieldType::custom(parser))
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn byte(mut self, byte: impl Into<ByteWidth>) -> Self {
        self.byte = Some(byte.into());
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = Some(endian);
        self
    }

    pub fn order(mut self, order: impl Into<Order>) -> Self {
        self.order = Some(order.into());
        self
    }
}

impl From<ScalarType> for SchemaEntry {
    fn from(value: ScalarType) -> Self {
        SchemaEntry::scalar(value)
    }
}

impl FromStr for SchemaEntry {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SchemaEntry::new(FieldType::from_name(s)?))
    }
}

/// Strategy for decoding a `custom` field.
///
/// Implemented for every `Fn(&ByteReader, &ParseDetails) -> Result<Parsed, DecodeError>`,
/// so closures work directly; implement it by hand for reusable parsers.
pub trait CustomParse: Send + Sync {
    fn parse(
        &self,
        reader: &ByteReader<'_>,
        details: &ParseDetails<'_>,
    ) -> Result<Parsed, DecodeError>;
}

impl<F> CustomParse for F
where
    F: Fn(&ByteReader<'_>, &ParseDetails<'_>) -> Result<Parsed, DecodeError> + Send + Sync,
{
    fn parse(
        &self,
        reader: &ByteReader<'_>,
        details: &ParseDetails<'_>,
    ) -> Result<Parsed, DecodeError> {
        self(reader, details)
    }
}

/// Output of a custom parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub value: Value,
    /// Bytes consumed. `None` keeps the length computed from `byte` and `count`.
    pub length: Option<usize>,
}

impl Parsed {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            length: None,
        }
    }

    pub fn with_length(value: Value, length: usize) -> Self {
        Self {
            value,
            length: Some(length),
        }
    }
}

/// Context handed to a custom parser alongside its reader.
#[derive(Debug)]
pub struct ParseDetails<'a> {
    /// Absolute start offset of the field.
    pub offset: usize,
    /// Length computed from `byte` and `count`.
    pub length: usize,
    /// The whole input buffer.
    pub buffer: &'a [u8],
    pub byte: &'a ByteWidth,
    pub count: usize,
    pub endian: Endian,
    /// Fields processed so far.
    pub data: &'a Record,
    pub(crate) depth: usize,
    /// Tightest `max_depth` of the enclosing calls.
    pub(crate) max_depth: usize,
}

impl ParseDetails<'_> {
    /// Decodes `options` against the same buffer one nesting level deeper.
    ///
    /// Fails with [DecodeError::RecursionLimit] once the depth exceeds
    /// `options.max_depth` or the bound of any enclosing call, whichever is
    /// smaller.
    pub fn decode(&self, options: &DecodeOptions) -> Result<Decoded, DecodeError> {
        decoder::decode_at_depth(self.buffer, options, self.depth + 1, self.max_depth)
    }

    /// Nesting level of the call that invoked this parser; 0 for a top-level decode.
    pub fn depth(&self) -> usize {
        self.depth
    }
}
