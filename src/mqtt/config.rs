use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String,
    pub keep_alive_secs: u64,
    /// Capacity of the request queue and of the channel to the display loop
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "ozw-monitor".to_string(),
            topic: "zwave/monitor".to_string(),
            keep_alive_secs: 5,
            channel_capacity: 100,
        }
    }
}

impl MqttConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
