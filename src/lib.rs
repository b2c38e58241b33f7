//! Diagnostic monitor for OpenZWave notifications published on an MQTT broker.
//!
//! Each notification carries its details as headers; the packed `ValueID`
//! header is decoded into node, genre, command class, index and type, and the
//! numeric codes are named using tables parsed from the OpenZWave headers.

pub mod command_classes;
pub mod config;
pub mod decoder;
pub mod display;
pub mod error;
pub mod headers;
pub mod monitor;
pub mod mqtt;

pub use error::MonitorError;
