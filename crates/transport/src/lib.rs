//! # Transport
//!
//! Publish/subscribe transport collaborator, modeled as a process-scoped
//! node with explicit init/teardown. Each advertised topic gets a bounded
//! queue and a dedicated worker task draining into a pluggable sink backend,
//! so a slow or failing backend never stalls the acquisition loop.

mod error;
mod handle;
mod metrics;
mod node;
mod sinks;

pub use error::TransportError;
pub use handle::{TopicHandle, TopicPublisher};
pub use metrics::{MetricsSnapshot, TopicMetrics};
pub use node::TransportNode;
pub use sinks::{FileSink, LogSink, MemorySink, MessageStore, NetworkSink};
