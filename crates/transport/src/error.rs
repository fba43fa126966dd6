//! Transport error types

use thiserror::Error;

/// Transport-level errors (node setup and sink creation)
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to create a sink backend for a topic
    #[error("failed to create sink for topic '{topic}': {message}")]
    SinkCreation { topic: String, message: String },

    /// Sink parameters are missing or malformed
    #[error("invalid sink parameter '{param}': {message}")]
    InvalidParam { param: String, message: String },
}

impl TransportError {
    /// Create sink creation error
    pub fn sink_creation(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create invalid parameter error
    pub fn invalid_param(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParam {
            param: param.into(),
            message: message.into(),
        }
    }
}
