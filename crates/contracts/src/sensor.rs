//! RgbdSensor trait - RGB-D source capability interface
//!
//! Defines the interface an attached sensor source must provide, decoupling
//! the relay from concrete sensor implementations. Supports unified handling
//! of hardware-backed and simulated sources.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{FramePair, RelayError};

/// Health reported by an attached source, polled every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    /// Source is streaming and a capture may be attempted
    Ok,
    /// Source exists but has not started producing frames yet
    NotReady,
    /// Source reported an internal failure
    Error,
}

/// Stream modality, one gate and one intrinsics channel each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Color,
    Depth,
}

impl Modality {
    /// Label used in logs and metric tags.
    pub fn label(&self) -> &'static str {
        match self {
            Modality::Color => "color",
            Modality::Depth => "depth",
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single entry in an intrinsic parameter bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Float(f64),
    Text(String),
}

/// Generic key/value parameter bag reported by a source for one modality.
///
/// The intrinsics extractor validates and consumes this; the relay never
/// publishes a bag directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntrinsicParams {
    entries: HashMap<String, ParamValue>,
}

impl IntrinsicParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the bag carries an entry under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Numeric entry lookup.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.entries.get(key) {
            Some(ParamValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Text entry lookup.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(ParamValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Insert a numeric entry (builder style, used by sources).
    pub fn with_f64(mut self, key: impl Into<String>, value: f64) -> Self {
        self.entries.insert(key.into(), ParamValue::Float(value));
        self
    }

    /// Insert a text entry (builder style, used by sources).
    pub fn with_str(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), ParamValue::Text(value.into()));
        self
    }

    /// Remove an entry, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

/// RGB-D source capability interface.
///
/// Implemented by hardware wrappers and simulated sources alike. The relay
/// binds at most one source at a time and is the only caller during a run,
/// but sources must still be `Send + Sync` because attach/detach happen on a
/// control path separate from the periodic capture task.
///
/// # Example
///
/// ```ignore
/// let sensor: Arc<dyn RgbdSensor> = factory.create_source(&spec)?;
/// if sensor.status() == SensorStatus::Ok {
///     let pair = sensor.frame_pair()?;
///     // ... convert and publish ...
/// }
/// ```
pub trait RgbdSensor: Send + Sync + std::fmt::Debug {
    /// Current health of the source.
    fn status(&self) -> SensorStatus;

    /// Capture one color+depth pair with per-modality timestamps, atomically.
    ///
    /// # Errors
    /// Returns a capture error when the source cannot produce a pair this
    /// instant; the caller retries on its next tick.
    fn frame_pair(&self) -> Result<FramePair, RelayError>;

    /// Intrinsic parameter bag for the color stream.
    fn color_intrinsics(&self) -> Result<IntrinsicParams, RelayError>;

    /// Intrinsic parameter bag for the depth stream.
    fn depth_intrinsics(&self) -> Result<IntrinsicParams, RelayError>;

    /// Reported capture dimensions (width, height) for the color stream.
    fn color_dimensions(&self) -> (u32, u32);

    /// Reported capture dimensions (width, height) for the depth stream.
    fn depth_dimensions(&self) -> (u32, u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_bag_lookup() {
        let bag = IntrinsicParams::new()
            .with_f64("focalLengthX", 600.0)
            .with_str("distortionModel", "plumb_bob");

        assert!(bag.contains("focalLengthX"));
        assert_eq!(bag.get_f64("focalLengthX"), Some(600.0));
        assert_eq!(bag.get_str("distortionModel"), Some("plumb_bob"));

        // Wrong-typed lookup misses rather than converting
        assert_eq!(bag.get_f64("distortionModel"), None);
        assert_eq!(bag.get_str("focalLengthX"), None);
    }

    #[test]
    fn test_param_bag_remove() {
        let mut bag = IntrinsicParams::new().with_f64("k3", 0.1);
        assert!(bag.remove("k3"));
        assert!(!bag.contains("k3"));
        assert!(!bag.remove("k3"));
    }

    #[test]
    fn test_modality_labels() {
        assert_eq!(Modality::Color.label(), "color");
        assert_eq!(Modality::Depth.to_string(), "depth");
    }
}
