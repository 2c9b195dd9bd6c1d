//! Error types for schema construction, decoding and typed projection.

use thiserror::Error;

/// Errors produced while building a [crate::schema::Schema] from type names or a
/// serialized definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Type name is not one of the recognised scalar, array or `custom` kinds.
    #[error("unknown type: {0}")]
    UnknownType(String),
    /// Endianness is neither `little` nor `big`.
    #[error("unknown endian: {0}")]
    UnknownEndian(String),
    /// A `custom` field was declared without a parser.
    #[error("custom field `{0}` has no parser")]
    MissingParser(String),
    /// The same field name appears more than once.
    #[error("duplicate field `{0}`")]
    DuplicateField(String),
}

/// Errors produced by [crate::decode].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The schema itself is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Requested byte range is beyond the end of the buffer.
    #[error("read of {len} bytes at offset {offset} is out of range for a buffer of {buffer_len} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },
    /// The validator rejected the decoded record.
    #[error("validation error")]
    Validation,
    /// A nested decode went deeper than the configured maximum.
    #[error("nested decode exceeded the maximum depth of {0}")]
    RecursionLimit(usize),
    /// Failure reported by a custom parser.
    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    /// Shorthand for custom parsers reporting their own failures.
    pub fn custom(message: impl Into<String>) -> Self {
        DecodeError::Custom(message.into())
    }
}

/// Errors produced when projecting decoded [crate::value::Value]s onto Rust types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The record has no entry with this name.
    #[error("field `{0}` is missing")]
    MissingField(String),
    /// The value has a different shape than the requested type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Wraps an error with the name of the field it occurred in.
    #[error("field `{field}`: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<ValueError>,
    },
}
