//! Synthetic test-pattern sensor
//!
//! Free-running RGB-D source that generates a moving gradient color image
//! and a flat depth field. Used as the self-owned subdevice and for
//! development without hardware.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use bytes::Bytes;
use contracts::{
    FramePair, IntrinsicParams, PixelCode, RelayError, RgbdImage, RgbdSensor, SensorStatus,
};
use tracing::debug;

use crate::mock_sensor::plumb_bob_params;

/// Synthetic sensor configuration
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Frame width (both modalities)
    pub width: u32,
    /// Frame height (both modalities)
    pub height: u32,
    /// Native frame rate (Hz); timestamps are quantized to this rate, so
    /// polling faster than the rate observes repeated stamps
    pub frequency_hz: f64,
    /// Flat depth value (meters)
    pub depth_m: f32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frequency_hz: 30.0,
            depth_m: 1.5,
        }
    }
}

/// Free-running synthetic RGB-D source
#[derive(Debug)]
pub struct SyntheticRgbdSensor {
    config: SyntheticConfig,
    start: Instant,
    frame_counter: AtomicU64,
}

impl SyntheticRgbdSensor {
    /// Create a synthetic source with the given configuration
    pub fn new(config: SyntheticConfig) -> Self {
        debug!(
            width = config.width,
            height = config.height,
            frequency_hz = config.frequency_hz,
            "synthetic sensor created"
        );
        Self {
            config,
            start: Instant::now(),
            frame_counter: AtomicU64::new(0),
        }
    }

    /// Create a synthetic source with default configuration
    pub fn with_defaults() -> Self {
        Self::new(SyntheticConfig::default())
    }

    /// Capture timestamp, quantized to the configured frame rate
    fn stamp(&self) -> f64 {
        let elapsed = self.start.elapsed().as_secs_f64();
        if self.config.frequency_hz > 0.0 {
            (elapsed * self.config.frequency_hz).floor() / self.config.frequency_hz
        } else {
            elapsed
        }
    }

    fn color_frame(&self, frame_no: u64) -> RgbdImage {
        let (w, h) = (self.config.width, self.config.height);
        let step = w * 3;
        let mut data = Vec::with_capacity((step * h) as usize);
        // Moving diagonal gradient so consecutive frames differ
        let shift = (frame_no & 0xff) as u32;
        for y in 0..h {
            for x in 0..w {
                data.push(((x + shift) & 0xff) as u8);
                data.push(((y + shift) & 0xff) as u8);
                data.push(((x + y) & 0xff) as u8);
            }
        }
        RgbdImage {
            width: w,
            height: h,
            step,
            pixel_code: PixelCode::Rgb8,
            data: Bytes::from(data),
        }
    }

    fn depth_frame(&self) -> RgbdImage {
        let (w, h) = (self.config.width, self.config.height);
        let step = w * 4;
        let mut data = Vec::with_capacity((step * h) as usize);
        let value = self.config.depth_m.to_le_bytes();
        for _ in 0..(w * h) {
            data.extend_from_slice(&value);
        }
        RgbdImage {
            width: w,
            height: h,
            step,
            pixel_code: PixelCode::MonoFloat,
            data: Bytes::from(data),
        }
    }
}

impl RgbdSensor for SyntheticRgbdSensor {
    fn status(&self) -> SensorStatus {
        SensorStatus::Ok
    }

    fn frame_pair(&self) -> Result<FramePair, RelayError> {
        let frame_no = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        let stamp = self.stamp();
        Ok(FramePair {
            color: self.color_frame(frame_no),
            depth: self.depth_frame(),
            color_stamp: stamp,
            depth_stamp: stamp,
        })
    }

    fn color_intrinsics(&self) -> Result<IntrinsicParams, RelayError> {
        Ok(plumb_bob_params(self.stamp()))
    }

    fn depth_intrinsics(&self) -> Result<IntrinsicParams, RelayError> {
        Ok(plumb_bob_params(self.stamp()))
    }

    fn color_dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn depth_dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SyntheticRgbdSensor {
        SyntheticRgbdSensor::new(SyntheticConfig {
            width: 8,
            height: 4,
            frequency_hz: 1000.0,
            depth_m: 2.0,
        })
    }

    #[test]
    fn test_frame_dimensions_and_codes() {
        let sensor = small();
        let pair = sensor.frame_pair().unwrap();

        assert_eq!(pair.color.width, 8);
        assert_eq!(pair.color.step, 24);
        assert_eq!(pair.color.pixel_code, PixelCode::Rgb8);
        assert_eq!(pair.color.data.len(), 96);

        assert_eq!(pair.depth.pixel_code, PixelCode::MonoFloat);
        assert_eq!(pair.depth.step, 32);
        assert_eq!(pair.depth.data.len(), 128);

        // Flat depth decodes back to the configured value
        let raw: [u8; 4] = pair.depth.data[0..4].try_into().unwrap();
        assert_eq!(f32::from_le_bytes(raw), 2.0);
    }

    #[test]
    fn test_consecutive_frames_differ() {
        let sensor = small();
        let a = sensor.frame_pair().unwrap();
        let b = sensor.frame_pair().unwrap();
        assert_ne!(a.color.data, b.color.data);
    }

    #[test]
    fn test_intrinsics_always_complete() {
        let sensor = small();
        let bag = sensor.color_intrinsics().unwrap();
        assert_eq!(bag.get_str("distortionModel"), Some("plumb_bob"));
        assert!(bag.contains("stamp"));
    }

    #[test]
    fn test_stamps_quantized_to_rate() {
        let sensor = SyntheticRgbdSensor::new(SyntheticConfig {
            width: 2,
            height: 2,
            frequency_hz: 1.0, // one frame per second
            depth_m: 1.0,
        });
        // Two immediate polls land in the same frame interval
        let a = sensor.frame_pair().unwrap();
        let b = sensor.frame_pair().unwrap();
        assert_eq!(a.color_stamp, b.color_stamp);
    }
}
