//! TopicHandle - manages one topic with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{RelayMessage, TopicSink};

use crate::metrics::TopicMetrics;

/// Handle to a running topic worker
///
/// Owned by the [`TransportNode`](crate::TransportNode); publication goes
/// through cheap-clone [`TopicPublisher`]s handed to producers.
pub struct TopicHandle {
    /// Topic name
    topic: Arc<str>,
    /// Channel to send messages to worker
    tx: mpsc::Sender<RelayMessage>,
    /// Shared metrics
    metrics: Arc<TopicMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl TopicHandle {
    /// Create a new TopicHandle and spawn the worker task
    pub fn spawn<S: TopicSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let topic: Arc<str> = Arc::from(sink.topic());
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(TopicMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_topic = Arc::clone(&topic);

        let worker_handle = tokio::spawn(async move {
            topic_worker(sink, rx, worker_metrics, worker_topic).await;
        });

        Self {
            topic,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get topic name
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<TopicMetrics> {
        &self.metrics
    }

    /// Create a cheap-clone publisher for this topic
    pub fn publisher(&self) -> TopicPublisher {
        TopicPublisher {
            topic: Arc::clone(&self.topic),
            tx: self.tx.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Shutdown the topic worker gracefully
    #[instrument(name = "topic_handle_shutdown", skip(self), fields(topic = %self.topic))]
    pub async fn shutdown(self) {
        // Drop senders to signal worker to stop; publishers held elsewhere
        // must already be gone by teardown time
        drop(self.tx);
        // Wait for worker to finish
        if let Err(e) = self.worker_handle.await {
            error!(topic = %self.topic, error = ?e, "Worker task panicked");
        }
        debug!(topic = %self.topic, "TopicHandle shutdown complete");
    }
}

/// Cheap-clone, non-blocking publication endpoint for one topic
#[derive(Clone)]
pub struct TopicPublisher {
    topic: Arc<str>,
    tx: mpsc::Sender<RelayMessage>,
    metrics: Arc<TopicMetrics>,
}

impl TopicPublisher {
    /// Get topic name
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish a message (non-blocking)
    ///
    /// Returns true if enqueued, false if queue full (message dropped) or
    /// the worker is gone.
    pub fn publish(&self, message: RelayMessage) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => {
                // Update queue length approximation
                self.metrics.set_queue_len(self.tx.capacity());
                self.metrics.inc_publish_count();
                true
            }
            Err(mpsc::error::TrySendError::Full(m)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    topic = %self.topic,
                    kind = m.kind(),
                    "Queue full, message dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(topic = %self.topic, "Topic worker closed unexpectedly");
                false
            }
        }
    }
}

/// Worker task that consumes messages and writes to the sink
#[instrument(
    name = "topic_worker_loop",
    skip(sink, rx, metrics),
    fields(topic = %topic)
)]
async fn topic_worker<S: TopicSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<RelayMessage>,
    metrics: Arc<TopicMetrics>,
    topic: Arc<str>,
) {
    debug!(topic = %topic, "Topic worker started");

    while let Some(message) = rx.recv().await {
        // Update queue length
        metrics.set_queue_len(rx.len());

        if let Err(e) = sink.publish(&message).await {
            metrics.inc_failure_count();
            error!(
                topic = %topic,
                kind = message.kind(),
                error = %e,
                "Publish failed"
            );
            // Continue processing - don't crash on single failure
        }
    }

    // Cleanup
    if let Err(e) = sink.flush().await {
        error!(topic = %topic, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(topic = %topic, error = %e, "Close failed on shutdown");
    }

    debug!(topic = %topic, "Topic worker stopped");
}
