//! Console rendering of notification messages.
//!
//! ```text
//! ------ ZWAVE MESSAGE (2026-10-16 12:00:00 +0200) ------
//!   notification node: 5 (0x05)
//!   notification type: Type_ValueChanged: A node value has been updated from the Z-Wave network.
//!             home ID: 0x0184e1a2
//!   node ID of device: 5
//!         value genre: ValueGenre_User: Basic values an ordinary user would be interested in.
//!          value type: ValueType_Bool: Boolean, true or false
//!           value idx: 0
//!       command class: 37 (COMMAND_CLASS_SWITCH_BINARY)
//!      subcommand idx: 1
//! ```

use crate::decoder::{parse_notification_code, DecodeError, PackedIdentifierDecoder};
use crate::mqtt::message_manager::NotificationMessage;
use tracing::warn;

pub const VALUE_ID_HEADER: &str = "ValueID";
pub const NOTIFICATION_TYPE_HEADER: &str = "NotificationType";
pub const HOME_ID_HEADER: &str = "HomeID";
pub const NOTIFICATION_NODE_HEADER: &str = "NotificationNodeId";
pub const NOTIFICATION_BYTE_HEADER: &str = "NotificationByte";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Renders one message as the separator line followed by one block per header.
pub fn render(message: &NotificationMessage, decoder: &PackedIdentifierDecoder<'_>) -> String {
    let mut lines = vec![format!(
        "------ ZWAVE MESSAGE ({}) ------",
        message.timestamp.format(TIMESTAMP_FORMAT)
    )];
    for (key, value) in &message.headers {
        lines.extend(render_header(key, value, decoder));
    }
    lines.join("\n")
}

/// Lines for a single header. A header that fails to decode yields an error
/// line instead of aborting the message.
pub fn render_header(key: &str, value: &str, decoder: &PackedIdentifierDecoder<'_>) -> Vec<String> {
    let rendered = match key {
        VALUE_ID_HEADER => render_value_id(value, decoder),
        NOTIFICATION_TYPE_HEADER => render_notification_type(value, decoder),
        HOME_ID_HEADER => parse_hex(value).map(|id| vec![labelled("home ID", format!("0x{id:08x}"))]),
        NOTIFICATION_NODE_HEADER => parse_hex(value)
            .map(|node| vec![labelled("notification node", format!("{node} (0x{node:02x})"))]),
        NOTIFICATION_BYTE_HEADER => Ok(vec![labelled("notification byte", value)]),
        _ => Ok(vec![verbatim(key, value)]),
    };

    rendered.unwrap_or_else(|e| {
        warn!("Could not decode header {}: {}", key, e);
        vec![verbatim(key, value), format!("      ! {e}")]
    })
}

fn render_value_id(
    value: &str,
    decoder: &PackedIdentifierDecoder<'_>,
) -> Result<Vec<String>, DecodeError> {
    let decoded = decoder.decode(value)?;
    Ok(vec![
        labelled("node ID of device", decoded.node_id()),
        labelled("value genre", &decoded.value_genre),
        labelled("value type", &decoded.value_type),
        labelled("value idx", decoded.value_idx()),
        labelled(
            "command class",
            format!("{} ({})", decoded.cmd_class(), decoded.command_class),
        ),
        labelled("subcommand idx", decoded.cmd_class_idx()),
    ])
}

fn render_notification_type(
    value: &str,
    decoder: &PackedIdentifierDecoder<'_>,
) -> Result<Vec<String>, DecodeError> {
    let code = parse_notification_code(value)?;
    Ok(vec![labelled(
        "notification type",
        decoder.decode_notification_type(code),
    )])
}

/// Hex-encoded header values that are not identifiers (home and node ids).
fn parse_hex(value: &str) -> Result<u32, DecodeError> {
    parse_notification_code(value)
}

fn labelled(label: &str, value: impl std::fmt::Display) -> String {
    format!("{label:>19}: {value}")
}

fn verbatim(key: &str, value: &str) -> String {
    format!("   {key} : {value}")
}
