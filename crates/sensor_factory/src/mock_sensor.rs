//! Scripted mock sensor
//!
//! Implements `RgbdSensor` with fully scripted behavior: the caller queues
//! frame pairs, sets the reported status, and edits the intrinsic parameter
//! bags. Used for deterministic tests without hardware.

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;
use contracts::{
    FramePair, IntrinsicParams, PixelCode, RelayError, RgbdImage, RgbdSensor, SensorStatus,
};

/// A complete plumb_bob parameter bag with all eleven required numeric
/// fields present.
///
/// Tests start from this and remove or overwrite entries to script failure
/// cases.
pub fn plumb_bob_params(stamp: f64) -> IntrinsicParams {
    IntrinsicParams::new()
        .with_str("distortionModel", "plumb_bob")
        .with_f64("physFocalLength", 0.0019)
        .with_f64("focalLengthX", 600.0)
        .with_f64("focalLengthY", 600.0)
        .with_f64("principalPointX", 320.0)
        .with_f64("principalPointY", 240.0)
        .with_f64("k1", 0.05)
        .with_f64("k2", -0.12)
        .with_f64("t1", 0.001)
        .with_f64("t2", -0.002)
        .with_f64("k3", 0.03)
        .with_f64("stamp", stamp)
}

#[derive(Debug)]
struct MockState {
    status: SensorStatus,
    frames: VecDeque<FramePair>,
    fail_capture: bool,
    /// None scripts a failing intrinsics query
    color_params: Option<IntrinsicParams>,
    depth_params: Option<IntrinsicParams>,
    color_dims: (u32, u32),
    depth_dims: (u32, u32),
}

/// Scripted RGB-D source
///
/// Interior mutability keeps the scripting API usable through the shared
/// `Arc<dyn RgbdSensor>` the relay holds.
#[derive(Debug)]
pub struct MockRgbdSensor {
    state: Mutex<MockState>,
}

impl Default for MockRgbdSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRgbdSensor {
    /// Create a mock reporting Ok status, 640x480 on both modalities, and
    /// complete plumb_bob intrinsics; no frames queued.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                status: SensorStatus::Ok,
                frames: VecDeque::new(),
                fail_capture: false,
                color_params: Some(plumb_bob_params(0.0)),
                depth_params: Some(plumb_bob_params(0.0)),
                color_dims: (640, 480),
                depth_dims: (640, 480),
            }),
        }
    }

    /// Script the reported status.
    pub fn set_status(&self, status: SensorStatus) {
        self.lock().status = status;
    }

    /// Queue one captured pair.
    pub fn push_frame(&self, pair: FramePair) {
        self.lock().frames.push_back(pair);
    }

    /// Queue a small synthetic pair with the given per-modality stamps.
    pub fn push_stamps(&self, color_stamp: f64, depth_stamp: f64) {
        let pair = FramePair {
            color: test_image(PixelCode::Rgb8, 4, 4),
            depth: test_image(PixelCode::MonoFloat, 4, 4),
            color_stamp,
            depth_stamp,
        };
        self.push_frame(pair);
    }

    /// Script whether capture fails regardless of queued frames.
    pub fn set_fail_capture(&self, fail: bool) {
        self.lock().fail_capture = fail;
    }

    /// Replace the color bag; `None` scripts a failing query.
    pub fn set_color_params(&self, params: Option<IntrinsicParams>) {
        self.lock().color_params = params;
    }

    /// Replace the depth bag; `None` scripts a failing query.
    pub fn set_depth_params(&self, params: Option<IntrinsicParams>) {
        self.lock().depth_params = params;
    }

    /// Script the reported capture dimensions.
    pub fn set_dimensions(&self, color: (u32, u32), depth: (u32, u32)) {
        let mut state = self.lock();
        state.color_dims = color;
        state.depth_dims = depth;
    }

    /// Number of frames still queued.
    pub fn queued_frames(&self) -> usize {
        self.lock().frames.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Build a tiny image buffer for scripted pairs
fn test_image(pixel_code: PixelCode, width: u32, height: u32) -> RgbdImage {
    let bpp: u32 = match pixel_code {
        PixelCode::Rgb8 | PixelCode::Bgr8 => 3,
        PixelCode::Rgba8 | PixelCode::Bgra8 | PixelCode::MonoFloat => 4,
        PixelCode::Mono16 => 2,
        _ => 1,
    };
    let step = width * bpp;
    RgbdImage {
        width,
        height,
        step,
        pixel_code,
        data: Bytes::from(vec![0u8; (step * height) as usize]),
    }
}

impl RgbdSensor for MockRgbdSensor {
    fn status(&self) -> SensorStatus {
        self.lock().status
    }

    fn frame_pair(&self) -> Result<FramePair, RelayError> {
        let mut state = self.lock();
        if state.fail_capture {
            return Err(RelayError::capture("scripted capture failure"));
        }
        state
            .frames
            .pop_front()
            .ok_or_else(|| RelayError::capture("no scripted frame queued"))
    }

    fn color_intrinsics(&self) -> Result<IntrinsicParams, RelayError> {
        self.lock().color_params.clone().ok_or_else(|| {
            RelayError::intrinsics_unavailable(
                contracts::Modality::Color,
                "scripted query failure",
            )
        })
    }

    fn depth_intrinsics(&self) -> Result<IntrinsicParams, RelayError> {
        self.lock().depth_params.clone().ok_or_else(|| {
            RelayError::intrinsics_unavailable(
                contracts::Modality::Depth,
                "scripted query failure",
            )
        })
    }

    fn color_dimensions(&self) -> (u32, u32) {
        self.lock().color_dims
    }

    fn depth_dimensions(&self) -> (u32, u32) {
        self.lock().depth_dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_frames_pop_in_order() {
        let sensor = MockRgbdSensor::new();
        sensor.push_stamps(1.0, 1.0);
        sensor.push_stamps(2.0, 3.0);

        let first = sensor.frame_pair().unwrap();
        assert_eq!(first.color_stamp, 1.0);
        let second = sensor.frame_pair().unwrap();
        assert_eq!(second.depth_stamp, 3.0);

        // Queue exhausted
        assert!(sensor.frame_pair().is_err());
    }

    #[test]
    fn test_scripted_capture_failure() {
        let sensor = MockRgbdSensor::new();
        sensor.push_stamps(1.0, 1.0);
        sensor.set_fail_capture(true);
        assert!(sensor.frame_pair().is_err());
        assert_eq!(sensor.queued_frames(), 1);
    }

    #[test]
    fn test_scripted_intrinsics_failure() {
        let sensor = MockRgbdSensor::new();
        assert!(sensor.color_intrinsics().is_ok());

        sensor.set_color_params(None);
        let err = sensor.color_intrinsics().unwrap_err();
        assert!(matches!(
            err,
            RelayError::IntrinsicsUnavailable { .. }
        ));
        // Depth unaffected
        assert!(sensor.depth_intrinsics().is_ok());
    }

    #[test]
    fn test_default_params_complete() {
        let bag = plumb_bob_params(1.5);
        for field in [
            "physFocalLength",
            "focalLengthX",
            "focalLengthY",
            "principalPointX",
            "principalPointY",
            "k1",
            "k2",
            "t1",
            "t2",
            "k3",
            "stamp",
        ] {
            assert!(bag.contains(field), "missing {field}");
        }
        assert_eq!(bag.get_str("distortionModel"), Some("plumb_bob"));
        assert_eq!(bag.get_f64("stamp"), Some(1.5));
    }
}
