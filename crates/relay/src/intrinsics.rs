//! Camera intrinsics extraction
//!
//! Reads the generic parameter bag a source reports for one modality,
//! validates it, and produces the outbound camera-info record. Fails closed:
//! a bag with any required field missing, or any distortion model other than
//! plumb_bob, yields an error and no partial record.

use contracts::{
    CameraInfo, FrameId, IntrinsicParams, MessageHeader, Modality, RegionOfInterest, RelayError,
    RgbdSensor,
};
use tracing::trace;

/// The single supported distortion model.
const SUPPORTED_DISTORTION_MODEL: &str = "plumb_bob";

/// Required numeric fields, checked in this order; the first missing one is
/// named in the error.
const REQUIRED_FIELDS: [&str; 11] = [
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
];

/// Validated intrinsics for one modality, rebuilt on every publish attempt
/// because the subdevice can be reconfigured at runtime.
#[derive(Debug, Clone, Copy)]
struct IntrinsicsRecord {
    phys_focal_length: f64,
    fx: f64,
    fy: f64,
    cx: f64,
    cy: f64,
    k1: f64,
    k2: f64,
    t1: f64,
    t2: f64,
    k3: f64,
    stamp: f64,
}

/// Extract and validate the camera-info message for one modality.
///
/// Steps, in order, each a hard failure point:
/// 1. query the bag from the source
/// 2. require a distortion model identifier
/// 3. require the model to be plumb_bob
/// 4. require all eleven numeric fields
/// 5. take width/height from the source's reported dimensions
///
/// The resulting message carries the record's own capture stamp; the caller
/// may overwrite it with the paired image stamp when synchronized mode is
/// enabled.
pub fn extract_camera_info(
    sensor: &dyn RgbdSensor,
    modality: Modality,
    frame_id: &FrameId,
) -> Result<CameraInfo, RelayError> {
    let bag = query_bag(sensor, modality)?;
    let record = parse_record(&bag, modality)?;

    trace!(
        %modality,
        fx = record.fx,
        fy = record.fy,
        phys_focal_length = record.phys_focal_length,
        "intrinsics extracted"
    );

    let (width, height) = match modality {
        Modality::Color => sensor.color_dimensions(),
        Modality::Depth => sensor.depth_dimensions(),
    };

    Ok(build_camera_info(&record, frame_id, width, height))
}

fn query_bag(sensor: &dyn RgbdSensor, modality: Modality) -> Result<IntrinsicParams, RelayError> {
    let result = match modality {
        Modality::Color => sensor.color_intrinsics(),
        Modality::Depth => sensor.depth_intrinsics(),
    };
    result.map_err(|e| {
        if e.is_intrinsics() {
            e
        } else {
            RelayError::intrinsics_unavailable(modality, e.to_string())
        }
    })
}

fn parse_record(bag: &IntrinsicParams, modality: Modality) -> Result<IntrinsicsRecord, RelayError> {
    let model = bag
        .get_str("distortionModel")
        .ok_or(RelayError::MissingDistortionModel { modality })?;

    if model != SUPPORTED_DISTORTION_MODEL {
        return Err(RelayError::UnsupportedDistortionModel {
            modality,
            model: model.to_string(),
        });
    }

    let mut values = [0.0f64; REQUIRED_FIELDS.len()];
    for (slot, field) in values.iter_mut().zip(REQUIRED_FIELDS) {
        *slot = bag
            .get_f64(field)
            .ok_or(RelayError::MissingIntrinsicField { modality, field })?;
    }

    let [phys_focal_length, fx, fy, cx, cy, k1, k2, t1, t2, k3, stamp] = values;
    Ok(IntrinsicsRecord {
        phys_focal_length,
        fx,
        fy,
        cx,
        cy,
        k1,
        k2,
        t1,
        t2,
        k3,
        stamp,
    })
}

fn build_camera_info(
    record: &IntrinsicsRecord,
    frame_id: &FrameId,
    width: u32,
    height: u32,
) -> CameraInfo {
    let IntrinsicsRecord {
        fx, fy, cx, cy, ..
    } = *record;

    CameraInfo {
        header: MessageHeader {
            stamp: record.stamp,
            frame_id: frame_id.clone(),
        },
        width,
        height,
        distortion_model: SUPPORTED_DISTORTION_MODEL.to_string(),
        d: [record.k1, record.k2, record.t1, record.t2, record.k3],
        k: [
            fx, 0.0, cx, //
            0.0, fy, cy, //
            0.0, 0.0, 1.0,
        ],
        // Rectification is meaningless for a monocular stream; identity
        r: [
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ],
        p: [
            fx, 0.0, cx, 0.0, //
            0.0, fy, cy, 0.0, //
            0.0, 0.0, 1.0, 0.0,
        ],
        binning_x: 0,
        binning_y: 0,
        roi: RegionOfInterest::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_factory::{plumb_bob_params, MockRgbdSensor};

    #[test]
    fn test_extract_complete_bag() {
        let sensor = MockRgbdSensor::new();
        sensor.set_color_params(Some(plumb_bob_params(4.2)));
        sensor.set_dimensions((1280, 720), (640, 480));

        let frame_id: FrameId = "camera_link".into();
        let info = extract_camera_info(&sensor, Modality::Color, &frame_id).unwrap();

        assert_eq!(info.width, 1280);
        assert_eq!(info.height, 720);
        assert_eq!(info.header.stamp, 4.2);
        assert_eq!(info.header.frame_id, "camera_link");
        assert_eq!(info.distortion_model, "plumb_bob");
        assert_eq!(info.d, [0.05, -0.12, 0.001, -0.002, 0.03]);
        // K derived from (fx, fy, cx, cy)
        assert_eq!(info.k[0], 600.0);
        assert_eq!(info.k[2], 320.0);
        assert_eq!(info.k[4], 600.0);
        assert_eq!(info.k[5], 240.0);
        assert_eq!(info.k[8], 1.0);
        // R identity
        assert_eq!(info.r, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        // P from the same four values
        assert_eq!(info.p[0], 600.0);
        assert_eq!(info.p[2], 320.0);
        assert_eq!(info.p[10], 1.0);
        // ROI and binning zeroed
        assert_eq!(info.binning_x, 0);
        assert_eq!(info.roi, RegionOfInterest::default());
    }

    #[test]
    fn test_depth_uses_depth_dimensions() {
        let sensor = MockRgbdSensor::new();
        sensor.set_dimensions((1280, 720), (512, 424));

        let frame_id: FrameId = "camera_link".into();
        let info = extract_camera_info(&sensor, Modality::Depth, &frame_id).unwrap();
        assert_eq!((info.width, info.height), (512, 424));
    }

    #[test]
    fn test_query_failure() {
        let sensor = MockRgbdSensor::new();
        sensor.set_depth_params(None);

        let frame_id: FrameId = "camera_link".into();
        let err = extract_camera_info(&sensor, Modality::Depth, &frame_id).unwrap_err();
        assert!(matches!(err, RelayError::IntrinsicsUnavailable { .. }));
    }

    #[test]
    fn test_missing_distortion_model() {
        let sensor = MockRgbdSensor::new();
        let mut bag = plumb_bob_params(1.0);
        bag.remove("distortionModel");
        sensor.set_color_params(Some(bag));

        let frame_id: FrameId = "camera_link".into();
        let err = extract_camera_info(&sensor, Modality::Color, &frame_id).unwrap_err();
        assert!(matches!(err, RelayError::MissingDistortionModel { .. }));
    }

    #[test]
    fn test_unsupported_distortion_model() {
        let sensor = MockRgbdSensor::new();
        let bag = plumb_bob_params(1.0).with_str("distortionModel", "rational_polynomial");
        sensor.set_color_params(Some(bag));

        let frame_id: FrameId = "camera_link".into();
        let err = extract_camera_info(&sensor, Modality::Color, &frame_id).unwrap_err();
        match err {
            RelayError::UnsupportedDistortionModel { model, .. } => {
                assert_eq!(model, "rational_polynomial");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_first_missing_field_is_named() {
        let frame_id: FrameId = "camera_link".into();

        for field in REQUIRED_FIELDS {
            let sensor = MockRgbdSensor::new();
            let mut bag = plumb_bob_params(1.0);
            bag.remove(field);
            sensor.set_color_params(Some(bag));

            let err = extract_camera_info(&sensor, Modality::Color, &frame_id).unwrap_err();
            match err {
                RelayError::MissingIntrinsicField { field: named, .. } => {
                    assert_eq!(named, field);
                }
                other => panic!("unexpected error for {field}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_k3_specifically() {
        let sensor = MockRgbdSensor::new();
        let mut bag = plumb_bob_params(1.0);
        bag.remove("k3");
        sensor.set_color_params(Some(bag));

        let frame_id: FrameId = "camera_link".into();
        let err = extract_camera_info(&sensor, Modality::Color, &frame_id).unwrap_err();
        assert!(err.to_string().contains("k3"), "got: {err}");
    }
}
