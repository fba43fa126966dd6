//! Configuration validation module
//!
//! Validation rules:
//! - field constraints (non-empty names, period > 0) via the derive layer
//! - topic names unique across the four channels
//! - subdevice kind non-empty when present
//! - network transport requires an 'addr' parameter

use std::collections::HashSet;

use contracts::{RelayConfig, RelayError, SinkKind};
use validator::Validate;

/// Validate a RelayConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &RelayConfig) -> Result<(), RelayError> {
    validate_fields(config)?;
    validate_topic_uniqueness(config)?;
    validate_subdevice(config)?;
    validate_transport(config)?;
    Ok(())
}

/// Field-level constraints declared on the config types themselves
fn validate_fields(config: &RelayConfig) -> Result<(), RelayError> {
    config.validate().map_err(|e| {
        let field = e
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "config".to_string());
        RelayError::config_validation(field, e.to_string())
    })
}

/// The four topics must not collide
fn validate_topic_uniqueness(config: &RelayConfig) -> Result<(), RelayError> {
    let mut seen = HashSet::new();
    for topic in config.topics.all() {
        if !seen.insert(topic) {
            return Err(RelayError::config_validation(
                format!("topics[{topic}]"),
                "duplicate topic name",
            ));
        }
    }
    Ok(())
}

/// Subdevice spec sanity
fn validate_subdevice(config: &RelayConfig) -> Result<(), RelayError> {
    if let Some(subdevice) = &config.subdevice {
        if subdevice.kind.is_empty() {
            return Err(RelayError::config_validation(
                "subdevice.kind",
                "subdevice kind cannot be empty",
            ));
        }
    }
    Ok(())
}

/// Transport parameter requirements per sink kind
fn validate_transport(config: &RelayConfig) -> Result<(), RelayError> {
    if config.transport.kind == SinkKind::Network && !config.transport.params.contains_key("addr") {
        return Err(RelayError::config_validation(
            "transport.params.addr",
            "network transport requires an 'addr' parameter",
        ));
    }
    Ok(())
}
