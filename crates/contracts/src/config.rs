//! RelayConfig - Config Loader output
//!
//! Describes one relay instance: node identity, cadence, topic routing,
//! intrinsics sync policy, optional self-owned subdevice, transport backend.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

/// Default publish period (milliseconds).
pub const DEFAULT_PERIOD_MS: u64 = 30;

/// Default per-topic publisher queue depth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Complete relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RelayConfig {
    /// Node identity
    #[validate(nested)]
    pub node: NodeConfig,

    /// Publish period in milliseconds
    #[serde(default = "default_period_ms")]
    #[validate(range(min = 1))]
    pub period_ms: u64,

    /// Topic routing (all four required)
    #[validate(nested)]
    pub topics: TopicConfig,

    /// When set, camera-info messages borrow the paired image's timestamp
    /// instead of their own capture time
    #[serde(default)]
    pub force_info_sync: bool,

    /// When present, the relay constructs and owns this source internally
    /// instead of receiving one via attachment
    #[serde(default)]
    pub subdevice: Option<SubdeviceConfig>,

    /// Transport backend the topics publish through
    #[serde(default)]
    #[validate(nested)]
    pub transport: TransportConfig,
}

fn default_period_ms() -> u64 {
    DEFAULT_PERIOD_MS
}

impl RelayConfig {
    /// Publish period as a duration.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Node identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NodeConfig {
    /// Node name on the transport
    #[validate(length(min = 1))]
    pub name: String,

    /// Coordinate frame stamped into every outbound message
    #[validate(length(min = 1))]
    pub frame_id: String,
}

/// Topic names, one per output channel.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TopicConfig {
    /// Color image topic
    #[validate(length(min = 1))]
    pub color_image: String,

    /// Depth image topic
    #[validate(length(min = 1))]
    pub depth_image: String,

    /// Color camera-info topic
    #[validate(length(min = 1))]
    pub color_info: String,

    /// Depth camera-info topic
    #[validate(length(min = 1))]
    pub depth_info: String,
}

impl TopicConfig {
    /// All four topic names in publication order.
    pub fn all(&self) -> [&str; 4] {
        [
            &self.color_image,
            &self.depth_image,
            &self.color_info,
            &self.depth_info,
        ]
    }
}

/// Self-owned source specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubdeviceConfig {
    /// Source kind, resolved by the sensor factory registry
    pub kind: String,

    /// Kind-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Transport backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransportConfig {
    /// Sink kind instantiated once per topic
    #[serde(default)]
    pub kind: SinkKind,

    /// Per-topic publisher queue depth
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1))]
    pub queue_capacity: usize,

    /// Kind-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::Log,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            params: HashMap::new(),
        }
    }
}

/// Sink kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Log summaries via tracing
    #[default]
    Log,
    /// Write messages to disk
    File,
    /// Stream messages over UDP
    Network,
}
