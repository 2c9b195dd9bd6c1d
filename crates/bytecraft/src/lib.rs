//! # bytecraft
//!
//! A library for decoding binary buffers into records using declarative schemas.
//!
//! Describe each field by type (`uint8` … `float64`, `string`, `boolean`, their
//! arrays, or a custom parser), optional offset, width, count, endianness and
//! processing order, then decode byte slices into a [`value::Record`]. Fields
//! without an explicit offset are laid out back to back in processing order.
//!
//! ## Example
//!
//! ```
//! use bytecraft::{decode, DecodeOptions};
//! use bytecraft::bytes::Endian;
//! use bytecraft::field::{ScalarType, SchemaEntry};
//! use bytecraft::schema::Schema;
//! use bytecraft::value::Value;
//!
//! let schema = Schema::new()
//!     .field("id", ScalarType::Uint16)
//!     .field("name", SchemaEntry::scalar(ScalarType::String).byte(3))
//!     .field("values", SchemaEntry::array(ScalarType::Uint8, 2));
//!
//! let options = DecodeOptions::new(schema).endian(Endian::Little);
//! let decoded = decode(&[0x42, 0x00, b'a', b'b', b'c', 1, 2], &options).unwrap();
//!
//! assert_eq!(decoded.data.get("id"), Some(&Value::U16(0x42)));
//! assert_eq!(decoded.data.get_as::<String>("name").unwrap(), "abc");
//! assert_eq!(decoded.data.get_as::<Vec<u8>>("values").unwrap(), vec![1, 2]);
//! assert_eq!(decoded.meta.length, 7);
//! ```

pub mod bytes;
pub mod decoder;
pub mod errors;
pub mod field;
pub mod layout;
pub mod order;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod value;

pub use decoder::{DecodeOptions, Decoded, Meta, decode};
