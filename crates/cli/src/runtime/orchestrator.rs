//! Relay runtime orchestrator - coordinates all components.
//!
//! Wires the transport node, the sensor source, and the relay service
//! together, runs until a stop condition, and tears everything down in
//! stop-then-detach order.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{RelayConfig, RgbdSensor};
use relay::{CyclePublishers, RgbdRelay};
use sensor_factory::SyntheticRgbdSensor;
use tracing::{info, warn};
use transport::TransportNode;

use super::RelayStats;
use crate::error::CliError;

/// How often stop conditions are re-evaluated
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// The validated relay configuration
    pub config: RelayConfig,

    /// Stop after this many published color frames (None = unlimited)
    pub max_frames: Option<u64>,

    /// Stop after this wall-clock duration (None = no limit)
    pub duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main runtime orchestrator
pub struct Runtime {
    config: RuntimeConfig,
}

impl Runtime {
    /// Create a new runtime with the given configuration
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Run the relay until a stop condition or the shutdown future resolves
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<RelayStats> {
        let start_time = Instant::now();
        let relay_config = &self.config.config;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Transport node with one publisher per topic
        info!(node = %relay_config.node.name, "Setting up transport node...");
        let mut node = TransportNode::new(&relay_config.node.name);
        let topics = &relay_config.topics;

        let publishers = CyclePublishers {
            color_image: node
                .advertise_from_config(&topics.color_image, &relay_config.transport)
                .await
                .context("Failed to advertise color image topic")?,
            depth_image: node
                .advertise_from_config(&topics.depth_image, &relay_config.transport)
                .await
                .context("Failed to advertise depth image topic")?,
            color_info: node
                .advertise_from_config(&topics.color_info, &relay_config.transport)
                .await
                .context("Failed to advertise color info topic")?,
            depth_info: node
                .advertise_from_config(&topics.depth_info, &relay_config.transport)
                .await
                .context("Failed to advertise depth info topic")?,
        };

        info!(topics = 4, "Transport node configured");

        // Relay + sensor source
        let mut relay = RgbdRelay::new(relay_config, publishers);
        let source = self.create_source(relay_config)?;

        relay
            .attach(Some(source))
            .await
            .map_err(|e| CliError::attach(e.to_string()))?;

        info!(
            period_ms = relay_config.period_ms,
            max_frames = ?self.config.max_frames,
            duration = ?self.config.duration,
            "Relay running"
        );

        // Wait for a stop condition
        let color_image_topic = topics.color_image.clone();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(STOP_POLL_INTERVAL) => {}
            }

            if let Some(duration) = self.config.duration {
                if start_time.elapsed() >= duration {
                    info!(secs = duration.as_secs(), "Run duration reached");
                    break;
                }
            }

            if let Some(max_frames) = self.config.max_frames {
                let published = published_on(&node, &color_image_topic);
                if published >= max_frames {
                    info!(frames = published, "Reached max frames limit");
                    break;
                }
            }
        }

        // Shutdown: stop the periodic task, then drain the transport
        info!("Shutting down relay...");
        relay.close().await;

        let publish = relay.stats();
        // Dropping the relay releases its publisher clones so the topic
        // queues can drain to completion
        drop(relay);

        let topics_metrics = node.metrics();
        if let Err(_elapsed) =
            tokio::time::timeout(Duration::from_secs(5), node.teardown()).await
        {
            warn!("Transport teardown timed out");
        }

        let stats = RelayStats {
            duration: start_time.elapsed(),
            publish,
            topics: topics_metrics,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            "Relay shutdown complete"
        );

        Ok(stats)
    }

    /// Resolve the sensor source: a relay-owned subdevice when configured,
    /// otherwise the built-in test pattern standing in for an external
    /// attachment.
    fn create_source(&self, config: &RelayConfig) -> Result<Arc<dyn RgbdSensor>> {
        match &config.subdevice {
            Some(spec) => {
                info!(kind = %spec.kind, "Opening relay-owned subdevice");
                let source = sensor_factory::create_source(spec)
                    .with_context(|| format!("Failed to open subdevice '{}'", spec.kind))?;
                Ok(source)
            }
            None => {
                info!("No subdevice configured, attaching built-in test pattern source");
                Ok(Arc::new(SyntheticRgbdSensor::with_defaults()))
            }
        }
    }
}

/// Published message count on one topic
fn published_on(node: &TransportNode, topic: &str) -> u64 {
    node.metrics()
        .iter()
        .find(|(name, _)| name == topic)
        .map(|(_, snapshot)| snapshot.publish_count)
        .unwrap_or(0)
}
