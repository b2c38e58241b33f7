//! Shift-and-mask extraction of fixed-width fields from a 32-bit word.
//!
//! A layout is a slice of [`BitField`]s listed most-significant first. The
//! widths of every layout used by the decoder sum to exactly 32, so each bit of
//! the word belongs to exactly one named field.

use super::error::DecodeError;

/// Width of a packed half in bits.
pub const WORD_BITS: u32 = 32;

/// One named field of a packed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub name: &'static str,
    pub width: u32,
}

impl BitField {
    pub const fn new(name: &'static str, width: u32) -> Self {
        Self { name, width }
    }

    /// Largest value that fits in this field.
    pub const fn max_value(&self) -> u32 {
        if self.width >= WORD_BITS {
            u32::MAX
        } else {
            (1 << self.width) - 1
        }
    }
}

/// High half (`id`) of a packed value identifier.
///
/// ```text
/// 31..24  node_id
/// 23..22  value_genre
/// 21..14  cmd_class
/// 13..12  unused1
/// 11..4   value_idx
///  3..0   value_type
/// ```
pub const HIGH_HALF_LAYOUT: [BitField; 6] = [
    BitField::new("node_id", 8),
    BitField::new("value_genre", 2),
    BitField::new("cmd_class", 8),
    BitField::new("unused1", 2),
    BitField::new("value_idx", 8),
    BitField::new("value_type", 4),
];

/// Low half (`id1`) of a packed value identifier.
///
/// ```text
/// 31..24  cmd_class_idx
/// 23..0   unused2
/// ```
pub const LOW_HALF_LAYOUT: [BitField; 2] = [
    BitField::new("cmd_class_idx", 8),
    BitField::new("unused2", 24),
];

/// Total number of bits covered by a layout.
pub fn layout_width(layout: &[BitField]) -> u32 {
    layout.iter().map(|field| field.width).sum()
}

/// Splits `word` into the fields of `layout`, most-significant field first.
pub fn unpack<const N: usize>(word: u32, layout: &[BitField; N]) -> [u32; N] {
    debug_assert_eq!(layout_width(layout), WORD_BITS);

    let mut values = [0u32; N];
    let mut shift = WORD_BITS;
    for (value, field) in values.iter_mut().zip(layout.iter()) {
        shift -= field.width;
        *value = (word >> shift) & field.max_value();
    }
    values
}

/// Inverse of [`unpack`]. Fails if a value does not fit its field.
pub fn pack<const N: usize>(values: &[u32; N], layout: &[BitField; N]) -> Result<u32, DecodeError> {
    debug_assert_eq!(layout_width(layout), WORD_BITS);

    let mut word = 0u32;
    let mut shift = WORD_BITS;
    for (&value, field) in values.iter().zip(layout.iter()) {
        if value > field.max_value() {
            return Err(DecodeError::FieldOverflow {
                field: field.name,
                value,
                width: field.width,
            });
        }
        shift -= field.width;
        // a 32-bit wide field leaves shift at 0, where `<<` is still defined
        word |= value << shift;
    }
    Ok(word)
}
