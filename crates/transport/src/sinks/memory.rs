//! MemorySink - records published messages in memory
//!
//! The fake transport backend used by tests and scenario harnesses to
//! observe exactly what a topic published.

use std::sync::{Arc, Mutex};

use contracts::{RelayError, RelayMessage, TopicSink};

/// Shared, cloneable message store observed by tests
#[derive(Debug, Clone, Default)]
pub struct MessageStore(Arc<Mutex<Vec<RelayMessage>>>);

impl MessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded messages
    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> Vec<RelayMessage> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(&self, message: RelayMessage) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).push(message);
    }
}

/// Sink that appends every message to a [`MessageStore`]
pub struct MemorySink {
    topic: String,
    store: MessageStore,
}

impl MemorySink {
    /// Create a new MemorySink recording into the given store
    pub fn new(topic: impl Into<String>, store: MessageStore) -> Self {
        Self {
            topic: topic.into(),
            store,
        }
    }
}

impl TopicSink for MemorySink {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&mut self, message: &RelayMessage) -> Result<(), RelayError> {
        self.store.push(message.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), RelayError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), RelayError> {
        Ok(())
    }
}
