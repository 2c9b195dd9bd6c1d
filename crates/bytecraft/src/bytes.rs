//! Endianness-aware, read-only view over a byte slice.
//!
//! A [`ByteReader`] is anchored at an absolute offset in the buffer. Every
//! accessor takes an offset *relative* to that anchor. The window extends to
//! the end of the buffer, so a reader handed to a custom parser can look past
//! the field's declared length.

use crate::errors::{DecodeError, SchemaError};

/// Byte order for multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Endian {
    Little,
    #[default]
    Big,
}

impl std::str::FromStr for Endian {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "little" => Ok(Endian::Little),
            "big" => Ok(Endian::Big),
            other => Err(SchemaError::UnknownEndian(other.to_string())),
        }
    }
}

/// Read-only typed view of `buffer[base..]`.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    base: usize,
    endian: Endian,
}

/// Expands to a fixed-width accessor that honours the reader's endianness.
macro_rules! read_fixed {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&self, at: usize) -> Result<$ty, DecodeError> {
            let raw = self.array(at)?;
            Ok(match self.endian {
                Endian::Little => <$ty>::from_le_bytes(raw),
                Endian::Big => <$ty>::from_be_bytes(raw),
            })
        }
    };
}

impl<'a> ByteReader<'a> {
    /// Anchors a reader at `base`. Fails if `base` lies past the end of `buffer`.
    pub fn new(buffer: &'a [u8], base: usize, endian: Endian) -> Result<Self, DecodeError> {
        if base > buffer.len() {
            return Err(DecodeError::OutOfBounds {
                offset: base,
                len: 0,
                buffer_len: buffer.len(),
            });
        }

        Ok(Self {
            buffer,
            base,
            endian,
        })
    }

    /// Absolute offset of relative position 0.
    pub fn offset(&self) -> usize {
        self.base
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Number of bytes between the anchor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.base
    }

    /// Returns `len` bytes starting at relative offset `at`.
    pub fn bytes(&self, at: usize, len: usize) -> Result<&'a [u8], DecodeError> {
        let start = self.base.checked_add(at);
        let end = start.and_then(|start| start.checked_add(len));

        match (start, end) {
            (Some(start), Some(end)) if end <= self.buffer.len() => Ok(&self.buffer[start..end]),
            _ => Err(DecodeError::OutOfBounds {
                offset: self.base.saturating_add(at),
                len,
                buffer_len: self.buffer.len(),
            }),
        }
    }

    fn array<const N: usize>(&self, at: usize) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(at, N)?);
        Ok(out)
    }

    /// Reads one unsigned byte. Endianness does not apply.
    pub fn uint8(&self, at: usize) -> Result<u8, DecodeError> {
        Ok(self.bytes(at, 1)?[0])
    }

    /// Reads one signed byte. Endianness does not apply.
    pub fn int8(&self, at: usize) -> Result<i8, DecodeError> {
        Ok(self.uint8(at)? as i8)
    }

    read_fixed!(uint16, u16);
    read_fixed!(uint32, u32);
    read_fixed!(int16, i16);
    read_fixed!(int32, i32);
    read_fixed!(
        /// Reads an IEEE 754 single-precision float.
        float32,
        f32
    );
    read_fixed!(
        /// Reads an IEEE 754 double-precision float.
        float64,
        f64
    );
}
