//! Start offset and byte span of a field.

use crate::field::{ByteWidth, SchemaEntry};

/// Where a field starts and how many bytes it covers by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Absolute start offset.
    pub start: usize,
    pub byte: ByteWidth,
    pub count: usize,
    /// `byte * count`, or the sum of the used per-element widths.
    pub length: usize,
}

impl Layout {
    /// Resolves `entry` against the running `cursor`.
    pub fn resolve(entry: &SchemaEntry, cursor: usize) -> Self {
        let byte = entry
            .byte
            .clone()
            .unwrap_or_else(|| ByteWidth::Uniform(entry.kind.width()));
        let count = entry.count.unwrap_or(1);

        Layout {
            start: entry.offset.unwrap_or(cursor),
            length: total_length(&byte, count),
            byte,
            count,
        }
    }

    /// Per-element widths actually used: at most `count` of them.
    pub fn element_widths(&self) -> &[usize] {
        match &self.byte {
            ByteWidth::Uniform(_) => &[],
            ByteWidth::PerElement(widths) => &widths[..self.count.min(widths.len())],
        }
    }
}

/// Total byte length of `count` elements of width `byte`, saturating at
/// `usize::MAX` so an oversized field fails its bounds check instead.
pub fn total_length(byte: &ByteWidth, count: usize) -> usize {
    match byte {
        ByteWidth::Uniform(width) => width.saturating_mul(count),
        ByteWidth::PerElement(widths) => widths
            .iter()
            .take(count)
            .fold(0usize, |total, &width| total.saturating_add(width)),
    }
}
