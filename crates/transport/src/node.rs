//! TransportNode - process-scoped transport context
//!
//! Explicit init/teardown instead of a lazily constructed global: the node
//! is built once by the host process and its publishers are injected into
//! whatever produces messages, so tests can supply in-memory backends.

use tracing::{debug, info, instrument};

use contracts::{SinkKind, TopicSink, TransportConfig};

use crate::error::TransportError;
use crate::handle::{TopicHandle, TopicPublisher};
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, LogSink, NetworkSink};

/// Process-scoped transport node
///
/// Owns one worker per advertised topic. Publishers stay valid until
/// [`teardown`](TransportNode::teardown); teardown drains every queue and
/// closes every sink.
pub struct TransportNode {
    name: String,
    handles: Vec<TopicHandle>,
}

impl TransportNode {
    /// Create a new node
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        debug!(node = %name, "Transport node created");
        Self {
            name,
            handles: Vec::new(),
        }
    }

    /// Get node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Advertise a topic backed by the given sink
    pub fn advertise<S: TopicSink + Send + 'static>(
        &mut self,
        sink: S,
        queue_capacity: usize,
    ) -> TopicPublisher {
        let handle = TopicHandle::spawn(sink, queue_capacity);
        debug!(node = %self.name, topic = %handle.topic(), "Topic advertised");
        let publisher = handle.publisher();
        self.handles.push(handle);
        publisher
    }

    /// Advertise a topic with the backend selected by configuration
    #[instrument(
        name = "transport_advertise_from_config",
        skip(self, config),
        fields(node = %self.name, topic = %topic, kind = ?config.kind)
    )]
    pub async fn advertise_from_config(
        &mut self,
        topic: &str,
        config: &TransportConfig,
    ) -> Result<TopicPublisher, TransportError> {
        let capacity = config.queue_capacity;
        let publisher = match config.kind {
            SinkKind::Log => self.advertise(LogSink::new(topic), capacity),
            SinkKind::File => {
                let sink = FileSink::from_params(topic, &config.params)
                    .map_err(|e| TransportError::sink_creation(topic, e.to_string()))?;
                self.advertise(sink, capacity)
            }
            SinkKind::Network => {
                let sink = NetworkSink::from_params(topic, &config.params).await?;
                self.advertise(sink, capacity)
            }
        };
        Ok(publisher)
    }

    /// Get metrics for all topics
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.topic().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Tear the node down
    ///
    /// Drains and closes every topic worker. Publishers cloned from this
    /// node must be dropped first or the drain will wait on them.
    #[instrument(name = "transport_teardown", skip(self), fields(node = %self.name))]
    pub async fn teardown(self) {
        info!(node = %self.name, topics = self.handles.len(), "Transport node shutting down");
        for handle in self.handles {
            handle.shutdown().await;
        }
    }
}
