//! TopicSink trait - transport output interface
//!
//! Defines the abstract interface for per-topic publication backends.

use crate::{RelayError, RelayMessage};

/// Per-topic publication backend.
///
/// One sink instance serves exactly one topic; the transport layer runs each
/// sink on its own worker task behind a bounded queue.
#[trait_variant::make(TopicSink: Send)]
pub trait LocalTopicSink {
    /// Topic this sink publishes on (used for logging/metrics)
    fn topic(&self) -> &str;

    /// Publish one message
    ///
    /// # Errors
    /// Returns a write error (should include context); the worker logs and
    /// keeps consuming.
    async fn publish(&mut self, message: &RelayMessage) -> Result<(), RelayError>;

    /// Flush buffered output (if any)
    async fn flush(&mut self) -> Result<(), RelayError>;

    /// Close the sink
    async fn close(&mut self) -> Result<(), RelayError>;
}
