//! Packed identifier decoding.
//!
//! A Z-Wave value is addressed by a 64-bit `ValueID`. Its two 32-bit halves are
//! bitfield records (see [`bitfield::HIGH_HALF_LAYOUT`] and
//! [`bitfield::LOW_HALF_LAYOUT`]); three of the fields are resolved against
//! [`LookupTables`] to give them names.
//!
//! ```text
//! "0000000100420003"
//!   ├── id1 = 0x00000001 ─► cmd_class_idx, unused2
//!   └── id  = 0x00420003 ─► node_id, value_genre, cmd_class, unused1, value_idx, value_type
//! ```

pub mod bitfield;
pub mod error;
pub mod identifier;
pub mod tables;

pub use error::DecodeError;
pub use identifier::{
    parse_notification_code, DecodedIdentifier, HighHalf, LowHalf, PackedIdentifier,
    PackedIdentifierDecoder,
};
pub use tables::{CommandClassTable, LookupTable, LookupTables, Resolution, TableEntry};
