//! Layered error definitions
//!
//! Categorized by source: config / attach / capture / intrinsics / sink.
//! Nothing here crosses the periodic tick boundary - every runtime failure
//! is converted to a logged outcome by the relay.

use thiserror::Error;

use crate::Modality;

/// Unified error type
#[derive(Debug, Error)]
pub enum RelayError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Attach/Detach Errors =====
    /// The supplied handle is null or exposes no usable RGB-D interface
    #[error("attached device has no valid rgbd sensor interface")]
    InvalidHandle,

    /// Detach refused: the relay constructed and owns its own source
    #[error("cannot detach while the sensor source is owned by the relay")]
    OwnershipConflict,

    // ===== Capture Errors =====
    /// The source failed to produce a frame pair this tick
    #[error("capture failed: {message}")]
    Capture { message: String },

    // ===== Intrinsics Errors =====
    /// Querying the parameter bag itself failed
    #[error("unable to get intrinsic parameters from {modality} sensor: {message}")]
    IntrinsicsUnavailable { modality: Modality, message: String },

    /// The bag carries no distortion model identifier
    #[error("{modality} intrinsics missing distortion model")]
    MissingDistortionModel { modality: Modality },

    /// The bag names a distortion model this relay does not support
    #[error("{modality} distortion model '{model}' not supported")]
    UnsupportedDistortionModel { modality: Modality, model: String },

    /// A required numeric field is absent from the bag
    #[error("{modality} intrinsics missing parameter '{field}'")]
    MissingIntrinsicField {
        modality: Modality,
        field: &'static str,
    },

    // ===== Sensor Errors =====
    /// The source reported an explicit error status
    #[error("sensor returned error status")]
    SensorFault,

    // ===== Sink Errors =====
    /// Sink creation error
    #[error("sink '{topic}' creation error: {message}")]
    SinkCreation { topic: String, message: String },

    /// Sink write error
    #[error("sink '{topic}' write error: {message}")]
    SinkWrite { topic: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl RelayError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create capture error
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture {
            message: message.into(),
        }
    }

    /// Create intrinsics query error
    pub fn intrinsics_unavailable(modality: Modality, message: impl Into<String>) -> Self {
        Self::IntrinsicsUnavailable {
            modality,
            message: message.into(),
        }
    }

    /// Create sink creation error
    pub fn sink_creation(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Whether this error names an intrinsics extraction failure.
    ///
    /// Intrinsics failures skip only the camera-info publication for one
    /// modality; everything else about the tick proceeds.
    pub fn is_intrinsics(&self) -> bool {
        matches!(
            self,
            Self::IntrinsicsUnavailable { .. }
                | Self::MissingDistortionModel { .. }
                | Self::UnsupportedDistortionModel { .. }
                | Self::MissingIntrinsicField { .. }
        )
    }
}
