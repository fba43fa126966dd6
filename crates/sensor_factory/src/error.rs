//! Sensor factory error types

use thiserror::Error;

/// Factory errors
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The subdevice spec names a kind with no registered constructor
    #[error("unknown subdevice kind '{kind}'")]
    UnknownKind { kind: String },

    /// A kind-specific parameter is malformed
    #[error("invalid subdevice parameter '{param}': {message}")]
    InvalidParam { param: String, message: String },
}

impl FactoryError {
    /// Create unknown-kind error
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownKind { kind: kind.into() }
    }

    /// Create invalid-parameter error
    pub fn invalid_param(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParam {
            param: param.into(),
            message: message.into(),
        }
    }
}
