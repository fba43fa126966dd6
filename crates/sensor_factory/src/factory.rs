//! Source registry
//!
//! Maps a subdevice specification to a concrete `RgbdSensor` constructor.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{RgbdSensor, SubdeviceConfig};
use tracing::{info, instrument};

use crate::error::FactoryError;
use crate::synthetic::{SyntheticConfig, SyntheticRgbdSensor};

/// Construct a sensor source from a subdevice specification.
///
/// # Errors
/// - `UnknownKind` when no constructor is registered for `spec.kind`
/// - `InvalidParam` when a kind-specific parameter fails to parse
#[instrument(name = "factory_create_source", skip(spec), fields(kind = %spec.kind))]
pub fn create_source(spec: &SubdeviceConfig) -> Result<Arc<dyn RgbdSensor>, FactoryError> {
    match spec.kind.as_str() {
        "test_pattern" => {
            let config = synthetic_config_from_params(&spec.params)?;
            info!(
                width = config.width,
                height = config.height,
                frequency_hz = config.frequency_hz,
                "creating test_pattern source"
            );
            Ok(Arc::new(SyntheticRgbdSensor::new(config)))
        }
        other => Err(FactoryError::unknown_kind(other)),
    }
}

fn synthetic_config_from_params(
    params: &HashMap<String, String>,
) -> Result<SyntheticConfig, FactoryError> {
    let mut config = SyntheticConfig::default();
    if let Some(width) = params.get("width") {
        config.width = parse_param("width", width)?;
    }
    if let Some(height) = params.get("height") {
        config.height = parse_param("height", height)?;
    }
    if let Some(hz) = params.get("frequency_hz") {
        config.frequency_hz = parse_param("frequency_hz", hz)?;
    }
    if let Some(depth) = params.get("depth_m") {
        config.depth_m = parse_param("depth_m", depth)?;
    }
    Ok(config)
}

fn parse_param<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, FactoryError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| FactoryError::invalid_param(name, format!("'{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SensorStatus;

    #[test]
    fn test_create_test_pattern_source() {
        let spec = SubdeviceConfig {
            kind: "test_pattern".into(),
            params: HashMap::from([
                ("width".to_string(), "320".to_string()),
                ("height".to_string(), "240".to_string()),
            ]),
        };

        let sensor = create_source(&spec).unwrap();
        assert_eq!(sensor.status(), SensorStatus::Ok);
        assert_eq!(sensor.color_dimensions(), (320, 240));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let spec = SubdeviceConfig {
            kind: "realsense".into(),
            params: HashMap::new(),
        };

        let err = create_source(&spec).unwrap_err();
        assert!(matches!(err, FactoryError::UnknownKind { .. }));
        assert!(err.to_string().contains("realsense"));
    }

    #[test]
    fn test_malformed_param_rejected() {
        let spec = SubdeviceConfig {
            kind: "test_pattern".into(),
            params: HashMap::from([("width".to_string(), "not-a-number".to_string())]),
        };

        let err = create_source(&spec).unwrap_err();
        assert!(matches!(err, FactoryError::InvalidParam { .. }));
    }
}
