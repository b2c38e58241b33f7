//! Error types for identifier decoding

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The identifier text cannot be split into two 32-bit halves
    #[error("malformed identifier {input:?}: {reason}")]
    MalformedIdentifier { input: String, reason: String },

    /// A hex-encoded header code (notification type, node or home id) is not valid hex
    #[error("malformed hex code {0:?}")]
    MalformedHexCode(String),

    /// A value does not fit the width of its bitfield
    #[error("value {value} does not fit {width}-bit field {field}")]
    FieldOverflow {
        field: &'static str,
        value: u32,
        width: u32,
    },
}

impl DecodeError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        DecodeError::MalformedIdentifier {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
