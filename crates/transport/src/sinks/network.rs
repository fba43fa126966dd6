//! NetworkSink - UDP fire-and-forget streaming

use contracts::{RelayError, RelayMessage, TopicSink};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, warn};

use crate::error::TransportError;

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: NetworkFormat,
    /// Max packet size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, TransportError> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| TransportError::invalid_param("addr", "missing parameter"))?;

        let addr: SocketAddr = addr_str.parse().map_err(|e| {
            TransportError::invalid_param("addr", format!("invalid address '{addr_str}': {e}"))
        })?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => {
                return Err(TransportError::invalid_param(
                    "format",
                    format!("unknown format '{other}'"),
                ))
            }
        };

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000);

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Sink that sends messages over UDP
pub struct NetworkSink {
    topic: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    /// Create a new NetworkSink
    #[instrument(name = "network_sink_new", skip(topic, config))]
    pub async fn new(
        topic: impl Into<String>,
        config: NetworkSinkConfig,
    ) -> std::io::Result<Self> {
        let topic = topic.into();
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(&config.addr).await?;

        debug!(
            topic = %topic,
            target = %config.addr,
            "NetworkSink connected"
        );

        Ok(Self {
            topic,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "network_sink_from_params", skip(topic, params))]
    pub async fn from_params(
        topic: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, TransportError> {
        let topic = topic.into();
        let config = NetworkSinkConfig::from_params(params)?;

        Self::new(topic.clone(), config)
            .await
            .map_err(|e| TransportError::sink_creation(topic, e.to_string()))
    }

    fn serialize_message(&self, message: &RelayMessage) -> Result<Vec<u8>, String> {
        match self.config.format {
            NetworkFormat::Json => {
                serde_json::to_vec(message).map_err(|e| format!("json error: {e}"))
            }
            NetworkFormat::Bincode => {
                bincode::serialize(message).map_err(|e| format!("bincode error: {e}"))
            }
        }
    }

    fn socket(&self) -> Result<&UdpSocket, RelayError> {
        self.socket
            .as_ref()
            .ok_or_else(|| RelayError::sink_write(&self.topic, "socket not connected"))
    }

    fn prepare_payload(&self, message: &RelayMessage) -> Result<Vec<u8>, RelayError> {
        let data = self
            .serialize_message(message)
            .map_err(|e| RelayError::sink_write(&self.topic, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                topic = %self.topic,
                size = data.len(),
                max = self.config.max_packet_size,
                "Packet exceeds max size, send may fail"
            );
        }

        Ok(data)
    }

    async fn transmit(&self, socket: &UdpSocket, data: &[u8], stamp: f64) {
        match socket.send(data).await {
            Ok(sent) => {
                debug!(topic = %self.topic, stamp, bytes = sent, "Sent");
            }
            Err(e) => {
                // Log but don't fail - UDP is best-effort
                error!(topic = %self.topic, error = %e, "UDP send failed");
            }
        }
    }
}

impl TopicSink for NetworkSink {
    fn topic(&self) -> &str {
        &self.topic
    }

    #[instrument(
        name = "network_sink_publish",
        skip(self, message),
        fields(topic = %self.topic, kind = message.kind())
    )]
    async fn publish(&mut self, message: &RelayMessage) -> Result<(), RelayError> {
        let socket = self.socket()?;
        let data = self.prepare_payload(message)?;
        self.transmit(socket, &data, message.stamp()).await;
        Ok(())
    }

    #[instrument(name = "network_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), RelayError> {
        // UDP doesn't buffer
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), RelayError> {
        self.socket = None;
        debug!(topic = %self.topic, "NetworkSink closed");
        Ok(())
    }
}
