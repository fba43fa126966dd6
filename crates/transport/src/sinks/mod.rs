//! Sink backend implementations

mod file;
mod log;
mod memory;
mod network;

pub use file::{FileSink, FileSinkConfig};
pub use log::LogSink;
pub use memory::{MemorySink, MessageStore};
pub use network::{NetworkFormat, NetworkSink, NetworkSinkConfig};
