use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, SubscribeReasonCode};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::MqttConfig;
use super::message_manager::{MsgManager, NotificationMessage};
use crate::error::MonitorError;

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

#[derive(Clone, Debug, Default)]
pub struct MQTTStatus {
    pub connection_state: ConnectionState,
    pub messages_received: usize,
    pub messages_rejected: usize,
    pub last_activity: Option<chrono::DateTime<chrono::Local>>,
}

/// Owns the broker connection: subscribes to the monitor topic and forwards
/// every notification to the display loop in arrival order.
///
/// There is no reconnect. The first connection error ends [`MqttHandler::run`].
pub struct MqttHandler {
    status: MQTTStatus,
    client: AsyncClient,
    eventloop: EventLoop,
    config: MqttConfig,
    msg_manager: MsgManager,
}

impl MqttHandler {
    pub fn new(config: MqttConfig, msg_out: mpsc::Sender<NotificationMessage>) -> Self {
        let msg_manager = MsgManager {
            received_msg: msg_out,
        };
        let mut mqtt_options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        mqtt_options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));

        let (client, eventloop) = AsyncClient::new(mqtt_options, config.channel_capacity.max(1));

        MqttHandler {
            status: MQTTStatus::default(),
            client,
            eventloop,
            config,
            msg_manager,
        }
    }

    /// Handle for disconnecting from outside the receive loop.
    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }

    pub fn status(&self) -> &MQTTStatus {
        &self.status
    }

    /// Runs until the broker connection fails or the display loop goes away.
    pub async fn run(mut self) -> Result<MQTTStatus, MonitorError> {
        info!(
            "Connecting to broker at {}, topic {}",
            self.config.address(),
            self.config.topic
        );
        self.status.connection_state = ConnectionState::Connecting;

        // queued until the event loop has connected
        self.client
            .subscribe(self.config.topic.clone(), QoS::AtLeastOnce)
            .await
            .map_err(|source| MonitorError::Subscribe {
                topic: self.config.topic.clone(),
                source,
            })?;

        loop {
            let event = match self.eventloop.poll().await {
                Ok(event) => event,
                Err(source) => {
                    self.status.connection_state = ConnectionState::Failed;
                    return Err(MonitorError::BrokerConnection {
                        address: self.config.address(),
                        source,
                    });
                }
            };

            match event {
                Event::Incoming(Packet::ConnAck(_)) => {
                    self.status.connection_state = ConnectionState::Connected;
                    info!("Connected to broker at {}", self.config.address());
                }
                Event::Incoming(Packet::SubAck(suback)) => {
                    if suback
                        .return_codes
                        .iter()
                        .any(|code| matches!(code, SubscribeReasonCode::Failure))
                    {
                        self.status.connection_state = ConnectionState::Failed;
                        return Err(MonitorError::SubscriptionRefused {
                            topic: self.config.topic.clone(),
                        });
                    }
                    info!("Subscribed to {}", self.config.topic);
                }
                Event::Incoming(Packet::Publish(publish)) => {
                    self.status.last_activity = Some(chrono::Local::now());
                    match NotificationMessage::from_publish(&publish) {
                        Ok(message) => {
                            self.status.messages_received += 1;
                            if self.msg_manager.received_msg.send(message).await.is_err() {
                                debug!("Display loop closed, stopping receive loop");
                                self.status.connection_state = ConnectionState::Disconnected;
                                return Ok(self.status);
                            }
                        }
                        Err(e) => {
                            self.status.messages_rejected += 1;
                            warn!("Skipping message on {}: {}", publish.topic, e);
                        }
                    }
                }
                Event::Incoming(Packet::Disconnect) => {
                    self.status.connection_state = ConnectionState::Disconnected;
                    info!("Broker closed the session");
                    return Ok(self.status);
                }
                Event::Outgoing(rumqttc::Outgoing::Disconnect) => {
                    self.status.connection_state = ConnectionState::Disconnected;
                    info!("Disconnected from broker");
                    return Ok(self.status);
                }
                other => debug!("MQTT event: {:?}", other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const SUBACK_QOS1: u8 = 0x01;
    const SUBACK_FAILURE: u8 = 0x80;

    /// Reads one MQTT control packet: the type byte and the body.
    async fn read_packet(stream: &mut TcpStream) -> std::io::Result<(u8, Vec<u8>)> {
        let kind = stream.read_u8().await?;
        let mut len = 0usize;
        let mut shift = 0;
        loop {
            let byte = stream.read_u8().await?;
            len |= usize::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        let mut body = vec![0; len];
        stream.read_exact(&mut body).await?;
        Ok((kind, body))
    }

    fn publish_packet(topic: &str, payload: &str) -> Vec<u8> {
        let mut packet = vec![0x30, (2 + topic.len() + payload.len()) as u8];
        packet.extend_from_slice(&(topic.len() as u16).to_be_bytes());
        packet.extend_from_slice(topic.as_bytes());
        packet.extend_from_slice(payload.as_bytes());
        packet
    }

    /// Loopback broker for one client: accepts the CONNECT, answers SUBSCRIBE
    /// with `suback_code` and then sends `after_suback`.
    async fn spawn_broker(suback_code: u8, after_suback: Vec<u8>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            while let Ok((kind, body)) = read_packet(&mut stream).await {
                let reply = match kind >> 4 {
                    1 => vec![0x20, 0x02, 0x00, 0x00],
                    8 => {
                        let mut reply = vec![0x90, 0x03, body[0], body[1], suback_code];
                        reply.extend_from_slice(&after_suback);
                        reply
                    }
                    _ => continue,
                };
                if stream.write_all(&reply).await.is_err() {
                    break;
                }
            }
        });
        port
    }

    fn loopback_config(port: u16) -> MqttConfig {
        MqttConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..MqttConfig::default()
        }
    }

    #[tokio::test]
    async fn new_handler_starts_disconnected() {
        let (tx, _rx) = mpsc::channel(1);
        let handler = MqttHandler::new(MqttConfig::default(), tx);
        assert_eq!(handler.status().connection_state, ConnectionState::Disconnected);
        assert_eq!(handler.status().messages_received, 0);
    }

    #[tokio::test]
    async fn unreachable_broker_is_fatal() {
        // nothing listens on port 1 of the loopback interface
        let config = MqttConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..MqttConfig::default()
        };
        let (tx, _rx) = mpsc::channel(1);
        let result = MqttHandler::new(config, tx).run().await;
        assert!(matches!(result, Err(MonitorError::BrokerConnection { .. })));
    }

    #[tokio::test]
    async fn refused_subscription_is_fatal() {
        let port = spawn_broker(SUBACK_FAILURE, Vec::new()).await;
        let (tx, _rx) = mpsc::channel(1);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            MqttHandler::new(loopback_config(port), tx).run(),
        )
        .await
        .expect("run() kept waiting after a refused subscription");

        assert!(matches!(
            result,
            Err(MonitorError::SubscriptionRefused { ref topic }) if topic == "zwave/monitor"
        ));
    }

    #[tokio::test]
    async fn granted_subscription_forwards_publishes() {
        let publish = publish_packet("zwave/monitor", r#"{"NotificationType":"2"}"#);
        let port = spawn_broker(SUBACK_QOS1, publish).await;
        let (tx, mut rx) = mpsc::channel(1);
        let handle = tokio::spawn(MqttHandler::new(loopback_config(port), tx).run());

        let message = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no message forwarded")
            .expect("receive loop ended");
        assert_eq!(message.topic, "zwave/monitor");
        assert_eq!(message.header("NotificationType"), Some("2"));

        handle.abort();
    }
}
