//! The display loop: consumes messages from the MQTT handler one at a time
//! and prints their decoded form.

use crate::decoder::PackedIdentifierDecoder;
use crate::display;
use crate::mqtt::message_manager::NotificationMessage;
use std::future::Future;
use std::io::Write;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Prints every message until the sending side closes. Returns how many
/// messages were shown.
pub async fn display_messages<W: Write>(
    rx: &mut mpsc::Receiver<NotificationMessage>,
    decoder: &PackedIdentifierDecoder<'_>,
    out: &mut W,
) -> std::io::Result<usize> {
    let mut displayed = 0;
    while let Some(message) = rx.recv().await {
        debug!("Displaying {}", message);
        writeln!(out)?;
        writeln!(out, "{}", display::render(&message, decoder))?;
        out.flush()?;
        displayed += 1;
    }
    Ok(displayed)
}

/// Runs the display loop until the handler closes the channel, `interrupt`
/// completes or writing the output fails. `disconnect` runs on every one of
/// those paths before returning.
pub async fn run_session<W, I, D>(
    rx: &mut mpsc::Receiver<NotificationMessage>,
    decoder: &PackedIdentifierDecoder<'_>,
    out: &mut W,
    interrupt: I,
    disconnect: D,
) -> std::io::Result<()>
where
    W: Write,
    I: Future<Output = ()>,
    D: Future<Output = ()>,
{
    let result = tokio::select! {
        displayed = display_messages(rx, decoder, out) => displayed.map(|count| {
            info!("Receive loop ended after {} messages", count);
        }),
        _ = interrupt => {
            info!("Interrupted, disconnecting");
            Ok(())
        }
    };
    if let Err(e) = &result {
        error!("Writing output failed, disconnecting: {}", e);
    }
    disconnect.await;
    result
}
