//! Startup and connection errors of the monitor.
//!
//! Per-message problems are [`crate::decoder::DecodeError`]s and never end up
//! here; everything in [`MonitorError`] is fatal.

use crate::headers::HeaderParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Missing source directory or unusable config file
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The lookup tables could not be built from the native headers
    #[error("configuration error: {0}")]
    Headers(#[from] HeaderParseError),

    #[error("broker connection to {address} failed: {source}")]
    BrokerConnection {
        address: String,
        #[source]
        source: rumqttc::ConnectionError,
    },

    #[error("subscribing to {topic} failed: {source}")]
    Subscribe {
        topic: String,
        #[source]
        source: rumqttc::ClientError,
    },

    /// The broker answered the SUBSCRIBE with a failure return code
    #[error("broker refused subscription to {topic}")]
    SubscriptionRefused { topic: String },
}
