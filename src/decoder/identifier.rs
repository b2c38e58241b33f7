//! Decoding of the 64-bit `ValueID` carried in notification headers.

use super::bitfield::{unpack, HIGH_HALF_LAYOUT, LOW_HALF_LAYOUT};
use super::error::DecodeError;
use super::tables::{LookupTables, Resolution, TableEntry};

/// Hex digits in one packed half.
const HALF_HEX_DIGITS: usize = 8;

/// Fields of the high half (`id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighHalf {
    pub node_id: u8,
    pub value_genre: u8,
    pub cmd_class: u8,
    pub unused1: u8,
    pub value_idx: u8,
    pub value_type: u8,
}

impl From<u32> for HighHalf {
    fn from(word: u32) -> Self {
        let [node_id, value_genre, cmd_class, unused1, value_idx, value_type] =
            unpack(word, &HIGH_HALF_LAYOUT);
        // every field is at most 8 bits wide
        Self {
            node_id: node_id as u8,
            value_genre: value_genre as u8,
            cmd_class: cmd_class as u8,
            unused1: unused1 as u8,
            value_idx: value_idx as u8,
            value_type: value_type as u8,
        }
    }
}

/// Fields of the low half (`id1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LowHalf {
    pub cmd_class_idx: u8,
    pub unused2: u32,
}

impl From<u32> for LowHalf {
    fn from(word: u32) -> Self {
        let [cmd_class_idx, unused2] = unpack(word, &LOW_HALF_LAYOUT);
        Self {
            cmd_class_idx: cmd_class_idx as u8,
            unused2,
        }
    }
}

/// The numeric content of a packed identifier. No table lookups involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackedIdentifier {
    pub high: HighHalf,
    pub low: LowHalf,
}

impl PackedIdentifier {
    /// Parses the hex text form, e.g. `"0000000100420003"` or `"00000001 00420003"`.
    ///
    /// Whitespace anywhere is ignored. The last eight digits are the high half and
    /// anything before them the low half, which must fit in 32 bits.
    pub fn parse(input: &str) -> Result<Self, DecodeError> {
        let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();

        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(DecodeError::malformed(
                input,
                format!("non-hex character {bad:?}"),
            ));
        }
        if digits.len() < HALF_HEX_DIGITS {
            return Err(DecodeError::malformed(
                input,
                format!(
                    "expected at least {HALF_HEX_DIGITS} hex digits, got {}",
                    digits.len()
                ),
            ));
        }

        // all ASCII at this point, so byte offsets are char offsets
        let (low_text, high_text) = digits.split_at(digits.len() - HALF_HEX_DIGITS);
        let high = u32::from_str_radix(high_text, 16)
            .map_err(|e| DecodeError::malformed(input, e.to_string()))?;
        let low = if low_text.is_empty() {
            0
        } else {
            u32::from_str_radix(low_text, 16).map_err(|_| {
                DecodeError::malformed(input, format!("low half {low_text:?} exceeds 32 bits"))
            })?
        };

        Ok(Self::from_halves(high, low))
    }

    pub fn from_halves(high: u32, low: u32) -> Self {
        Self {
            high: HighHalf::from(high),
            low: LowHalf::from(low),
        }
    }
}

/// A packed identifier together with its symbolic lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedIdentifier<'t> {
    pub fields: PackedIdentifier,
    pub value_genre: Resolution<'t, TableEntry>,
    pub value_type: Resolution<'t, TableEntry>,
    pub command_class: Resolution<'t, String>,
}

impl DecodedIdentifier<'_> {
    pub fn node_id(&self) -> u8 {
        self.fields.high.node_id
    }

    pub fn value_idx(&self) -> u8 {
        self.fields.high.value_idx
    }

    pub fn cmd_class(&self) -> u8 {
        self.fields.high.cmd_class
    }

    pub fn cmd_class_idx(&self) -> u8 {
        self.fields.low.cmd_class_idx
    }
}

/// Turns `ValueID` and `NotificationType` header values into symbolic records.
///
/// Holds only a shared borrow of the tables, so any number of decoders can be
/// built over the same (or synthetic) tables.
#[derive(Debug, Clone, Copy)]
pub struct PackedIdentifierDecoder<'t> {
    tables: &'t LookupTables,
}

impl<'t> PackedIdentifierDecoder<'t> {
    pub fn new(tables: &'t LookupTables) -> Self {
        Self { tables }
    }

    pub fn decode(&self, identifier_hex: &str) -> Result<DecodedIdentifier<'t>, DecodeError> {
        let fields = PackedIdentifier::parse(identifier_hex)?;
        let high = fields.high;

        Ok(DecodedIdentifier {
            fields,
            value_genre: self.tables.value_genres.resolve(u32::from(high.value_genre)),
            value_type: self.tables.value_types.resolve(u32::from(high.value_type)),
            command_class: self.tables.command_classes.resolve(u32::from(high.cmd_class)),
        })
    }

    pub fn decode_notification_type(&self, code: u32) -> Resolution<'t, TableEntry> {
        self.tables.notification_types.resolve(code)
    }
}

/// Parses a hex-encoded header code such as the `NotificationType` value.
pub fn parse_notification_code(text: &str) -> Result<u32, DecodeError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::MalformedHexCode(text.to_string()));
    }
    u32::from_str_radix(digits, 16)
        .map_err(|_| DecodeError::MalformedHexCode(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::bitfield::pack;
    use crate::decoder::tables::{CommandClassTable, LookupTable};

    fn synthetic_tables() -> LookupTables {
        LookupTables {
            notification_types: [
                (0, TableEntry::new("Type_ValueAdded", "A new node value has been added")),
                (2, TableEntry::new("Type_ValueChanged", "A node value has been updated")),
            ]
            .into_iter()
            .collect(),
            value_genres: [
                (0, TableEntry::new("ValueGenre_Basic", "Basic level")),
                (1, TableEntry::new("ValueGenre_User", "Basic values a user would want")),
            ]
            .into_iter()
            .collect(),
            value_types: [
                (0, TableEntry::new("ValueType_Bool", "Boolean, true or false")),
                (3, TableEntry::new("ValueType_Int", "32-bit signed value")),
            ]
            .into_iter()
            .collect(),
            command_classes: [(0x20, "COMMAND_CLASS_BASIC"), (0x25, "COMMAND_CLASS_SWITCH_BINARY")]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn decodes_reference_example() {
        let tables = synthetic_tables();
        let decoder = PackedIdentifierDecoder::new(&tables);

        let decoded = decoder.decode("0000000100420003").unwrap();
        assert_eq!(
            decoded.fields.high,
            HighHalf {
                node_id: 0,
                value_genre: 1,
                cmd_class: 0x08,
                unused1: 0,
                value_idx: 0,
                value_type: 3,
            }
        );
        assert_eq!(decoded.fields.low, LowHalf { cmd_class_idx: 0, unused2: 1 });
        assert_eq!(decoded.value_genre.known().unwrap().name, "ValueGenre_User");
        assert_eq!(decoded.value_type.known().unwrap().name, "ValueType_Int");
        assert_eq!(decoded.command_class, Resolution::Unknown(0x08));
    }

    #[test]
    fn all_zero_identifier_uses_code_zero_entries() {
        let tables = synthetic_tables();
        let decoded = PackedIdentifierDecoder::new(&tables)
            .decode("0000000000000000")
            .unwrap();

        assert_eq!(decoded.fields, PackedIdentifier::default());
        assert_eq!(decoded.value_genre.known().unwrap().name, "ValueGenre_Basic");
        assert_eq!(decoded.value_type.known().unwrap().name, "ValueType_Bool");
        assert!(decoded.command_class.is_unknown());
    }

    #[test]
    fn decode_is_deterministic() {
        let tables = synthetic_tables();
        let decoder = PackedIdentifierDecoder::new(&tables);
        let first = decoder.decode("0300000005c94011").unwrap();
        let second = decoder.decode("0300000005c94011").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn resolves_switch_binary_value() {
        let high = pack(&[0x05, 1, 0x25, 0, 0, 0], &HIGH_HALF_LAYOUT).unwrap();
        let low = pack(&[0x02, 0], &LOW_HALF_LAYOUT).unwrap();
        let text = format!("{low:08x}{high:08x}");

        let tables = synthetic_tables();
        let decoded = PackedIdentifierDecoder::new(&tables).decode(&text).unwrap();

        assert_eq!(decoded.node_id(), 5);
        assert_eq!(decoded.cmd_class(), 0x25);
        assert_eq!(decoded.cmd_class_idx(), 2);
        assert_eq!(
            decoded.command_class.known().map(String::as_str),
            Some("COMMAND_CLASS_SWITCH_BINARY")
        );
    }

    #[test]
    fn whitespace_is_ignored() {
        let a = PackedIdentifier::parse("00000001 00420003").unwrap();
        let b = PackedIdentifier::parse(" 0000 0001\t0042 0003\n").unwrap();
        assert_eq!(a, PackedIdentifier::parse("0000000100420003").unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn unpadded_identifier_has_zero_low_half() {
        // publishers print the id without zero padding
        let id = PackedIdentifier::parse("00420003").unwrap();
        assert_eq!(id.low, LowHalf::default());
        assert_eq!(id.high.value_type, 3);

        let id = PackedIdentifier::parse("100420003").unwrap();
        assert_eq!(id.low.unused2, 1);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            PackedIdentifier::parse("zz"),
            Err(DecodeError::MalformedIdentifier { .. })
        ));
        assert!(matches!(
            PackedIdentifier::parse("00000000004200g3"),
            Err(DecodeError::MalformedIdentifier { .. })
        ));
        assert!(matches!(
            PackedIdentifier::parse("+0000000000420003"),
            Err(DecodeError::MalformedIdentifier { .. })
        ));
        assert!(matches!(
            PackedIdentifier::parse("420003"),
            Err(DecodeError::MalformedIdentifier { .. })
        ));
        assert!(matches!(
            PackedIdentifier::parse(""),
            Err(DecodeError::MalformedIdentifier { .. })
        ));
        // low half wider than 32 bits
        assert!(matches!(
            PackedIdentifier::parse("1ffffffff00420003"),
            Err(DecodeError::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn leading_zeros_in_low_half_are_accepted() {
        let id = PackedIdentifier::parse("000000000100420003").unwrap();
        assert_eq!(id.low.unused2, 1);
    }

    #[test]
    fn notification_type_lookup() {
        let tables = synthetic_tables();
        let decoder = PackedIdentifierDecoder::new(&tables);

        let code = parse_notification_code("2").unwrap();
        assert_eq!(
            decoder.decode_notification_type(code).known().unwrap().name,
            "Type_ValueChanged"
        );
        assert_eq!(decoder.decode_notification_type(9999), Resolution::Unknown(9999));
    }

    #[test]
    fn notification_code_is_hex() {
        assert_eq!(parse_notification_code("a").unwrap(), 10);
        assert_eq!(parse_notification_code("0x1b").unwrap(), 27);
        assert_eq!(parse_notification_code(" 12 ").unwrap(), 18);
        assert!(parse_notification_code("").is_err());
        assert!(parse_notification_code("xyz").is_err());
    }

    #[test]
    fn empty_tables_never_fail_decoding() {
        let tables = LookupTables {
            notification_types: LookupTable::new(),
            value_genres: LookupTable::new(),
            value_types: LookupTable::new(),
            command_classes: CommandClassTable::new(),
        };
        let decoded = PackedIdentifierDecoder::new(&tables)
            .decode("ffffffffffffffff")
            .unwrap();
        assert_eq!(decoded.node_id(), 0xff);
        assert_eq!(decoded.value_genre, Resolution::Unknown(3));
        assert_eq!(decoded.value_type, Resolution::Unknown(0xf));
    }
}
