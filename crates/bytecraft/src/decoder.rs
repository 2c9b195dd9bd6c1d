//! The decode engine: walks a [Schema] in processing order over one buffer.

use std::{fmt, sync::Arc};

use crate::{
    bytes::{ByteReader, Endian},
    errors::DecodeError,
    field::{ByteWidth, FieldType, ParseDetails, ScalarType},
    layout::Layout,
    schema::Schema,
    value::{FromRecord, Record, Value},
};

/// Default bound on nested decodes started through [ParseDetails::decode].
pub const DEFAULT_MAX_DEPTH: usize = 32;

type Validator = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Per-call configuration: the schema plus base offset, default byte order,
/// optional validator and nesting bound.
#[derive(Clone)]
pub struct DecodeOptions {
    pub schema: Schema,
    /// Start of the first field without an explicit offset.
    pub offset: usize,
    pub endian: Endian,
    pub validate: Option<Validator>,
    pub max_depth: usize,
}

impl DecodeOptions {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            offset: 0,
            endian: Endian::Big,
            validate: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Rejects the whole call with [DecodeError::Validation] when `validate` returns false.
    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("schema", &self.schema)
            .field("offset", &self.offset)
            .field("endian", &self.endian)
            .field("validate", &self.validate.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Span of the buffer a decode consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Meta {
    /// Base offset of the call.
    pub offset: usize,
    /// Bytes consumed from `offset`.
    pub length: usize,
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Decoded {
    pub data: Record,
    pub meta: Meta,
}

impl Decoded {
    /// Projects the record onto a caller-defined type.
    pub fn project<T: FromRecord>(&self) -> Result<T, crate::errors::ValueError> {
        T::from_record(&self.data)
    }
}

/// Decodes `buffer` according to `options`.
///
/// Fields are processed in [Schema::ordered] order. Each field starts at its
/// explicit offset or at the running cursor, and the cursor then advances by
/// the field's length. Any error aborts the call without a partial record.
pub fn decode(buffer: &[u8], options: &DecodeOptions) -> Result<Decoded, DecodeError> {
    decode_at_depth(buffer, options, 0, usize::MAX)
}

/// `outer_max_depth` is the bound inherited from enclosing calls; a nested
/// call can tighten it but never loosen it.
pub(crate) fn decode_at_depth(
    buffer: &[u8],
    options: &DecodeOptions,
    depth: usize,
    outer_max_depth: usize,
) -> Result<Decoded, DecodeError> {
    let max_depth = options.max_depth.min(outer_max_depth);
    if depth > max_depth {
        return Err(DecodeError::RecursionLimit(max_depth));
    }

    tracing::debug!(
        offset = options.offset,
        endian = ?options.endian,
        fields = options.schema.len(),
        depth,
        "decoding buffer"
    );

    let mut data = Record::with_capacity(options.schema.len());
    let mut cursor = options.offset;

    for (name, entry) in options.schema.ordered() {
        let layout = Layout::resolve(entry, cursor);
        let endian = entry.endian.unwrap_or(options.endian);
        let reader = ByteReader::new(buffer, layout.start, endian)?;

        let (value, consumed) = match &entry.kind {
            FieldType::Scalar(ty) => (read_element(&reader, *ty, 0, layout.length)?, layout.length),
            FieldType::Array(ty) => (read_array(&reader, *ty, &layout)?, layout.length),
            FieldType::Custom(parser) => {
                let details = ParseDetails {
                    offset: layout.start,
                    length: layout.length,
                    buffer,
                    byte: &layout.byte,
                    count: layout.count,
                    endian,
                    data: &data,
                    depth,
                    max_depth,
                };
                let parsed = parser.parse(&reader, &details)?;
                (parsed.value, parsed.length.unwrap_or(layout.length))
            }
        };

        tracing::trace!(field = name, start = layout.start, consumed, "decoded field");

        data.insert(name, value);
        cursor = cursor.saturating_add(consumed);
    }

    if let Some(validate) = &options.validate {
        if !validate(&data) {
            tracing::debug!(offset = options.offset, "validator rejected record");
            return Err(DecodeError::Validation);
        }
    }

    Ok(Decoded {
        data,
        meta: Meta {
            offset: options.offset,
            length: cursor - options.offset,
        },
    })
}

/// Reads one value at `at`. `len` only matters for strings; other types
/// read their native width.
fn read_element(
    reader: &ByteReader<'_>,
    ty: ScalarType,
    at: usize,
    len: usize,
) -> Result<Value, DecodeError> {
    Ok(match ty {
        ScalarType::Uint8 => Value::U8(reader.uint8(at)?),
        ScalarType::Uint16 => Value::U16(reader.uint16(at)?),
        ScalarType::Uint32 => Value::U32(reader.uint32(at)?),
        ScalarType::Int8 => Value::I8(reader.int8(at)?),
        ScalarType::Int16 => Value::I16(reader.int16(at)?),
        ScalarType::Int32 => Value::I32(reader.int32(at)?),
        ScalarType::Float32 => Value::F32(reader.float32(at)?),
        ScalarType::Float64 => Value::F64(reader.float64(at)?),
        ScalarType::Boolean => Value::Bool(reader.uint8(at)? != 0),
        ScalarType::String => Value::String(read_string(reader, at, len)?),
    })
}

/// Maps each byte to the char with the same code point, keeping NULs.
fn read_string(reader: &ByteReader<'_>, at: usize, len: usize) -> Result<String, DecodeError> {
    Ok(reader.bytes(at, len)?.iter().map(|&b| char::from(b)).collect())
}

fn read_array(
    reader: &ByteReader<'_>,
    ty: ScalarType,
    layout: &Layout,
) -> Result<Value, DecodeError> {
    if ty == ScalarType::String {
        return match layout.byte {
            // A uniform width reads the whole span as one string, not an array.
            ByteWidth::Uniform(_) => read_element(reader, ty, 0, layout.length),
            ByteWidth::PerElement(_) => {
                reader.bytes(0, layout.length)?;

                let mut values = Vec::with_capacity(layout.element_widths().len());
                let mut at = 0;
                for &width in layout.element_widths() {
                    values.push(Value::String(read_string(reader, at, width)?));
                    at += width;
                }
                Ok(Value::Array(values))
            }
        };
    }

    // The whole array has to fit before anything is allocated for it.
    let width = ty.width();
    reader.bytes(0, width.saturating_mul(layout.count))?;

    let mut values = Vec::with_capacity(layout.count);
    for i in 0..layout.count {
        values.push(read_element(reader, ty, i * width, width)?);
    }

    Ok(Value::Array(values))
}

#[cfg(test)]
mod tests {
    use crate::{
        errors::SchemaError,
        field::{Parsed, SchemaEntry},
        order::Order,
    };

    use super::*;

    #[test]
    fn test_decode_empty() {
        let result = decode(&[1, 2, 3], &DecodeOptions::new(Schema::new())).unwrap();
        assert!(result.data.is_empty());
        assert_eq!(result.meta, Meta { offset: 0, length: 0 });
    }

    #[test]
    fn test_scalars_sequential() {
        let data = [
            0x01, // a
            0x01, 0x02, // b
            0x01, 0x02, 0x03, 0x04, // c
            0xff, // d
            0xff, 0xfe, // e
            0xff, 0xff, 0xff, 0xfd, // f
        ];
        let schema = Schema::new()
            .field("a", ScalarType::Uint8)
            .field("b", ScalarType::Uint16)
            .field("c", ScalarType::Uint32)
            .field("d", ScalarType::Int8)
            .field("e", ScalarType::Int16)
            .field("f", ScalarType::Int32);

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();

        assert_eq!(result.data.get("a"), Some(&Value::U8(1)));
        assert_eq!(result.data.get("b"), Some(&Value::U16(0x0102)));
        assert_eq!(result.data.get("c"), Some(&Value::U32(0x01020304)));
        assert_eq!(result.data.get("d"), Some(&Value::I8(-1)));
        assert_eq!(result.data.get("e"), Some(&Value::I16(-2)));
        assert_eq!(result.data.get("f"), Some(&Value::I32(-3)));
        assert_eq!(result.meta.length, data.len());
    }

    #[test]
    fn test_floats_little_endian() {
        let mut data = Vec::new();
        data.extend_from_slice(&3.5f32.to_le_bytes());
        data.extend_from_slice(&(-1.25f64).to_le_bytes());

        let schema = Schema::new()
            .field("a", ScalarType::Float32)
            .field("b", ScalarType::Float64);
        let options = DecodeOptions::new(schema).endian(Endian::Little);
        let result = decode(&data, &options).unwrap();

        assert_eq!(result.data.get("a"), Some(&Value::F32(3.5)));
        assert_eq!(result.data.get("b"), Some(&Value::F64(-1.25)));
    }

    #[test]
    fn test_field_endian_override() {
        let data = [0x12, 0x34, 0x12, 0x34];
        let schema = Schema::new()
            .field("a", ScalarType::Uint16)
            .field("b", SchemaEntry::scalar(ScalarType::Uint16).endian(Endian::Little));

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        assert_eq!(result.data.get("a"), Some(&Value::U16(0x1234)));
        assert_eq!(result.data.get("b"), Some(&Value::U16(0x3412)));
    }

    #[test]
    fn test_strings_and_booleans() {
        let data = b"helloworld!\x01\x00";
        let schema = Schema::new()
            .field("a", SchemaEntry::scalar(ScalarType::String).byte(5))
            .field("b", SchemaEntry::scalar(ScalarType::String).byte(6))
            .field("c", ScalarType::Boolean)
            .field("d", ScalarType::Boolean);

        let result = decode(data, &DecodeOptions::new(schema)).unwrap();
        assert_eq!(result.data.get_as::<String>("a").unwrap(), "hello");
        assert_eq!(result.data.get_as::<String>("b").unwrap(), "world!");
        assert_eq!(result.data.get("c"), Some(&Value::Bool(true)));
        assert_eq!(result.data.get("d"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_string_keeps_nul_and_high_bytes() {
        let data = [b'a', 0x00, 0xe9];
        let schema = Schema::new().field("s", SchemaEntry::scalar(ScalarType::String).byte(3));

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        let s = result.data.get_as::<String>("s").unwrap();
        assert_eq!(s, "a\0\u{e9}");
        assert_eq!(s.chars().count(), 3);
    }

    #[test]
    fn test_arrays() {
        let data = [
            0x00, 0x01, 0x00, 0x02, 0x00, 0x03, // uint16[3]
            0x01, 0x00, 0x02, // boolean[3]
            0xff, 0x01, // int8[2]
        ];
        let schema = Schema::new()
            .field("a", SchemaEntry::array(ScalarType::Uint16, 3))
            .field("b", SchemaEntry::array(ScalarType::Boolean, 3))
            .field("c", SchemaEntry::array(ScalarType::Int8, 2));

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        assert_eq!(result.data.get_as::<Vec<u16>>("a").unwrap(), vec![1, 2, 3]);
        assert_eq!(
            result.data.get_as::<Vec<bool>>("b").unwrap(),
            vec![true, false, true]
        );
        assert_eq!(result.data.get_as::<Vec<i8>>("c").unwrap(), vec![-1, 1]);
        assert_eq!(result.meta.length, 11);
    }

    #[test]
    fn test_numeric_arrays() {
        let cases = vec![
            (
                ScalarType::Uint32,
                vec![0x00, 0x00, 0x00, 0x01, 0xff, 0xff, 0xff, 0xff],
                vec![Value::U32(1), Value::U32(u32::MAX)],
            ),
            (
                ScalarType::Int16,
                vec![0xff, 0xfe, 0x00, 0x02],
                vec![Value::I16(-2), Value::I16(2)],
            ),
            (
                ScalarType::Int32,
                vec![0xff, 0xff, 0xff, 0xfd, 0x00, 0x00, 0x01, 0x00],
                vec![Value::I32(-3), Value::I32(256)],
            ),
            (
                ScalarType::Float32,
                [1.5f32.to_be_bytes(), (-2.0f32).to_be_bytes()].concat(),
                vec![Value::F32(1.5), Value::F32(-2.0)],
            ),
            (
                ScalarType::Float64,
                [0.125f64.to_be_bytes(), 1e10f64.to_be_bytes()].concat(),
                vec![Value::F64(0.125), Value::F64(1e10)],
            ),
        ];

        for (ty, data, expected) in cases {
            let schema = Schema::new().field("a", SchemaEntry::array(ty, 2));
            let result = decode(&data, &DecodeOptions::new(schema)).unwrap();

            assert_eq!(result.data.get("a"), Some(&Value::Array(expected)), "{}[]", ty.name());
            assert_eq!(result.meta.length, ty.width() * 2);
        }
    }

    #[test]
    fn test_huge_count_is_out_of_bounds() {
        let schema =
            Schema::new().field("a", SchemaEntry::array(ScalarType::Uint8, usize::MAX / 2));
        assert_eq!(
            decode(&[1, 2, 3], &DecodeOptions::new(schema)).unwrap_err(),
            DecodeError::OutOfBounds {
                offset: 0,
                len: usize::MAX / 2,
                buffer_len: 3
            }
        );

        let schema =
            Schema::new().field("a", SchemaEntry::array(ScalarType::Float64, usize::MAX));
        assert!(matches!(
            decode(&[1, 2, 3], &DecodeOptions::new(schema)).unwrap_err(),
            DecodeError::OutOfBounds { len: usize::MAX, .. }
        ));
    }

    #[test]
    fn test_huge_element_width_is_out_of_bounds() {
        let schema = Schema::new().field(
            "a",
            SchemaEntry::array(ScalarType::String, 2).byte(vec![usize::MAX, 1]),
        );
        assert_eq!(
            decode(b"abc", &DecodeOptions::new(schema)).unwrap_err(),
            DecodeError::OutOfBounds {
                offset: 0,
                len: usize::MAX,
                buffer_len: 3
            }
        );
    }

    #[test]
    fn test_string_array_per_element() {
        let schema =
            Schema::new().field("a", SchemaEntry::array(ScalarType::String, 2).byte([5, 6]));

        let result = decode(b"helloworld!", &DecodeOptions::new(schema)).unwrap();
        assert_eq!(
            result.data.get_as::<Vec<String>>("a").unwrap(),
            vec!["hello".to_string(), "world!".to_string()]
        );
        assert_eq!(result.meta.length, 11);
    }

    #[test]
    fn test_string_array_count_caps_widths() {
        let schema = Schema::new()
            .field("a", SchemaEntry::array(ScalarType::String, 1).byte([5, 6]))
            .field("b", ScalarType::Uint8);

        let result = decode(b"hello!", &DecodeOptions::new(schema)).unwrap();
        assert_eq!(
            result.data.get("a"),
            Some(&Value::Array(vec![Value::String("hello".to_string())]))
        );
        assert_eq!(result.data.get("b"), Some(&Value::U8(b'!')));
    }

    #[test]
    fn test_string_array_uniform_width_is_one_string() {
        let schema = Schema::new().field("a", SchemaEntry::array(ScalarType::String, 2).byte(3));

        let result = decode(b"abcdef", &DecodeOptions::new(schema)).unwrap();
        assert_eq!(result.data.get("a"), Some(&Value::String("abcdef".to_string())));
        assert_eq!(result.meta.length, 6);
    }

    #[test]
    fn test_byte_override_pads() {
        let data = [0x07, 0x00, 0x00, 0x00, 0x08];
        let schema = Schema::new()
            .field("a", SchemaEntry::scalar(ScalarType::Uint8).byte(4))
            .field("b", ScalarType::Uint8);

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        assert_eq!(result.data.get("a"), Some(&Value::U8(7)));
        assert_eq!(result.data.get("b"), Some(&Value::U8(8)));
    }

    #[test]
    fn test_base_offset() {
        let data = [0xaa, 0xbb, 0x01, 0x02];
        let schema = Schema::new().field("a", ScalarType::Uint16);

        let result = decode(&data, &DecodeOptions::new(schema).offset(2)).unwrap();
        assert_eq!(result.data.get("a"), Some(&Value::U16(0x0102)));
        assert_eq!(result.meta, Meta { offset: 2, length: 2 });
    }

    #[test]
    fn test_declaration_order_without_offsets() {
        let data = [0x0a, 0x0b, 0x0c];
        let schema = Schema::new()
            .field("1", ScalarType::Uint8)
            .field("3", ScalarType::Uint8)
            .field("2", ScalarType::Uint8);

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        assert_eq!(result.data.get("1"), Some(&Value::U8(0x0a)));
        assert_eq!(result.data.get("3"), Some(&Value::U8(0x0b)));
        assert_eq!(result.data.get("2"), Some(&Value::U8(0x0c)));
    }

    #[test]
    fn test_order_hints_change_layout() {
        let data = [0x0a, 0x0b, 0x0c];
        let schema = Schema::new()
            .field("1", SchemaEntry::scalar(ScalarType::Uint8).order(1))
            .field("3", SchemaEntry::scalar(ScalarType::Uint8).order(3))
            .field("2", SchemaEntry::scalar(ScalarType::Uint8).order(2));

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        assert_eq!(result.data.get("1"), Some(&Value::U8(0x0a)));
        assert_eq!(result.data.get("2"), Some(&Value::U8(0x0b)));
        assert_eq!(result.data.get("3"), Some(&Value::U8(0x0c)));
        assert_eq!(result.data.keys().collect::<Vec<_>>(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_first_and_last() {
        let data = [0x0a, 0x0b, 0x0c];
        let schema = Schema::new()
            .field("z", SchemaEntry::scalar(ScalarType::Uint8).order(Order::Last))
            .field("m", ScalarType::Uint8)
            .field("a", SchemaEntry::scalar(ScalarType::Uint8).order(Order::First));

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        assert_eq!(result.data.get("a"), Some(&Value::U8(0x0a)));
        assert_eq!(result.data.get("m"), Some(&Value::U8(0x0b)));
        assert_eq!(result.data.get("z"), Some(&Value::U8(0x0c)));
    }

    #[test]
    fn test_explicit_offset_still_advances_cursor() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let schema = Schema::new()
            .field("a", SchemaEntry::scalar(ScalarType::Uint8).offset(3))
            .field("b", ScalarType::Uint8);

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        assert_eq!(result.data.get("a"), Some(&Value::U8(4)));
        assert_eq!(result.data.get("b"), Some(&Value::U8(2)));
        assert_eq!(result.meta.length, 2);
    }

    #[test]
    fn test_custom_with_length() {
        let data = [1, 0, 1, 0, 10, 20];
        let schema = Schema::new()
            .field(
                "a",
                SchemaEntry::custom(|reader, _| {
                    let mut flags = Vec::new();
                    for i in 0..3 {
                        flags.push(Value::Bool(reader.uint8(i)? == 1));
                    }
                    let value =
                        Value::Array(vec![Value::Array(flags), Value::U8(reader.uint8(3)?)]);
                    Ok(Parsed::with_length(value, 4))
                }),
            )
            .field("b", ScalarType::Uint8)
            .field(
                "c",
                SchemaEntry::custom(|reader, _| Ok(Parsed::new(Value::U8(reader.uint8(0)?))))
                    .byte(1),
            );

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        assert_eq!(
            result.data.get("a"),
            Some(&Value::Array(vec![
                Value::Array(vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]),
                Value::U8(0)
            ]))
        );
        assert_eq!(result.data.get("b"), Some(&Value::U8(10)));
        assert_eq!(result.data.get("c"), Some(&Value::U8(20)));
        assert_eq!(result.meta.length, 6);
    }

    #[test]
    fn test_custom_without_length_consumes_nothing_by_default() {
        let data = [0x05, 0x06];
        let schema = Schema::new()
            .field(
                "peek",
                SchemaEntry::custom(|reader, _| Ok(Parsed::new(Value::U8(reader.uint8(0)?)))),
            )
            .field("a", ScalarType::Uint8);

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        assert_eq!(result.data.get("peek"), Some(&Value::U8(5)));
        assert_eq!(result.data.get("a"), Some(&Value::U8(5)));
        assert_eq!(result.meta.length, 1);
    }

    #[test]
    fn test_custom_details() {
        let data = [0x03, 0xaa, 0xbb, 0xcc];
        let schema = Schema::new()
            .field("len", ScalarType::Uint8)
            .field(
                "body",
                SchemaEntry::custom(|reader, details| {
                    assert_eq!(details.offset, 1);
                    assert_eq!(details.length, 0);
                    assert_eq!(details.count, 1);
                    assert_eq!(details.endian, Endian::Little);
                    assert_eq!(details.buffer.len(), 4);
                    assert_eq!(details.depth(), 0);

                    let len: u8 = details
                        .data
                        .get_as("len")
                        .map_err(|e| DecodeError::custom(e.to_string()))?;
                    let bytes = reader.bytes(0, len as usize)?;
                    Ok(Parsed::with_length(Value::Bytes(bytes.to_vec()), bytes.len()))
                }),
            );

        let options = DecodeOptions::new(schema).endian(Endian::Little);
        let result = decode(&data, &options).unwrap();
        assert_eq!(result.data.get("body"), Some(&Value::Bytes(vec![0xaa, 0xbb, 0xcc])));
        assert_eq!(result.meta.length, 4);
    }

    #[test]
    fn test_custom_error_aborts() {
        let schema = Schema::new()
            .field("a", SchemaEntry::custom(|_, _| Err(DecodeError::custom("bad magic"))));

        assert_eq!(
            decode(&[0], &DecodeOptions::new(schema)).unwrap_err(),
            DecodeError::Custom("bad magic".to_string())
        );
    }

    #[test]
    fn test_nested_custom_decode() {
        let data = [1, 0, 1, 0, 10, 20, 20];
        let inner = DecodeOptions::new(
            Schema::new()
                .field("a", SchemaEntry::array(ScalarType::Boolean, 3))
                .field("b", ScalarType::Uint8),
        );

        let nested = inner.clone();
        let schema = Schema::new()
            .field(
                "a",
                SchemaEntry::custom(move |_, details| {
                    let decoded = details.decode(&nested.clone().offset(details.offset))?;
                    Ok(Parsed::with_length(
                        Value::Record(decoded.data),
                        decoded.meta.length,
                    ))
                }),
            )
            .field("b", ScalarType::Uint8)
            .field(
                "c",
                SchemaEntry::custom(|reader, details| {
                    assert!(details.data.contains_key("a"));
                    assert!(details.data.contains_key("b"));
                    Ok(Parsed::new(Value::U8(reader.uint8(0)?)))
                })
                .byte(1),
            );

        let result = decode(&data, &DecodeOptions::new(schema)).unwrap();
        let direct = decode(&data, &inner).unwrap();

        assert_eq!(result.data.get("a"), Some(&Value::Record(direct.data)));
        assert_eq!(result.data.get("b"), Some(&Value::U8(10)));
        assert_eq!(result.data.get("c"), Some(&Value::U8(20)));
        assert_eq!(result.meta.length, direct.meta.length + 2);
    }

    #[test]
    fn test_recursion_limit() {
        fn looping() -> Schema {
            Schema::new().field(
                "again",
                SchemaEntry::custom(|_, details| {
                    let decoded = details.decode(&DecodeOptions::new(looping()).max_depth(3))?;
                    Ok(Parsed::new(Value::Record(decoded.data)))
                }),
            )
        }

        let options = DecodeOptions::new(looping()).max_depth(3);
        assert_eq!(
            decode(&[0], &options).unwrap_err(),
            DecodeError::RecursionLimit(3)
        );
    }

    #[test]
    fn test_nested_decode_keeps_tightest_depth_bound() {
        fn looping(max_depth: Option<usize>) -> Schema {
            Schema::new().field(
                "again",
                SchemaEntry::custom(move |_, details| {
                    let mut options = DecodeOptions::new(looping(max_depth));
                    if let Some(max_depth) = max_depth {
                        options = options.max_depth(max_depth);
                    }
                    let decoded = details.decode(&options)?;
                    Ok(Parsed::new(Value::Record(decoded.data)))
                }),
            )
        }

        // Inner calls default to 32 but cannot loosen the outer bound.
        let options = DecodeOptions::new(looping(None)).max_depth(2);
        assert_eq!(
            decode(&[0], &options).unwrap_err(),
            DecodeError::RecursionLimit(2)
        );

        // A tighter inner bound still applies.
        let options = DecodeOptions::new(looping(Some(1)));
        assert_eq!(
            decode(&[0], &options).unwrap_err(),
            DecodeError::RecursionLimit(1)
        );
    }

    #[test]
    fn test_validation() {
        let data = [0x01, 0x02];
        let schema = Schema::new()
            .field("a", ScalarType::Uint8)
            .field("b", ScalarType::Uint8);

        let rejecting = DecodeOptions::new(schema.clone())
            .validate(|record| record.get_as::<u8>("a").is_ok_and(|a| a > 1));
        assert_eq!(decode(&data, &rejecting).unwrap_err(), DecodeError::Validation);

        let accepting = DecodeOptions::new(schema.clone()).validate(|record| record.len() == 2);
        assert_eq!(
            decode(&data, &accepting).unwrap(),
            decode(&data, &DecodeOptions::new(schema)).unwrap()
        );
    }

    #[test]
    fn test_out_of_bounds() {
        let schema = Schema::new()
            .field("a", ScalarType::Uint8)
            .field("b", ScalarType::Uint32);

        assert_eq!(
            decode(&[0, 1, 2], &DecodeOptions::new(schema)).unwrap_err(),
            DecodeError::OutOfBounds {
                offset: 1,
                len: 4,
                buffer_len: 3
            }
        );
    }

    #[test]
    fn test_offset_past_end() {
        let schema = Schema::new().field("a", SchemaEntry::scalar(ScalarType::Uint8).offset(9));
        assert!(matches!(
            decode(&[0], &DecodeOptions::new(schema)).unwrap_err(),
            DecodeError::OutOfBounds { offset: 9, .. }
        ));
    }

    #[test]
    fn test_unknown_type_name() {
        let err = "uint64"
            .parse::<SchemaEntry>()
            .map_err(DecodeError::from)
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::Schema(SchemaError::UnknownType("uint64".to_string()))
        );
    }
}
