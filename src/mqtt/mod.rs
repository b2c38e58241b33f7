//! # MQTT transport
//!
//! Subscribes to the single topic the OpenZWave bridge publishes its
//! notifications on and hands each one, with its headers, to the display loop.
//!
//! ```text
//! mqtt/
//! ├── config.rs           - broker address, client id and topic
//! ├── message_manager.rs  - NotificationMessage and the JSON header codec
//! └── mqtt_handler.rs     - connection and receive loop
//! ```
//!
//! Messages flow through a bounded channel with a single consumer, so they are
//! displayed strictly in the order the broker delivered them.

pub mod config;
pub mod message_manager;
pub mod mqtt_handler;
