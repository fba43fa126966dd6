//! Outbound wire messages - transport-side representation
//!
//! Message structures published on the image and camera-info topics, plus
//! the transport encoding vocabulary.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::FrameId;

/// Transport-side encoding tags.
///
/// String vocabulary understood by downstream subscribers. Every sensor-side
/// `PixelCode` maps to exactly one of these.
pub mod encoding {
    pub const RGB8: &str = "rgb8";
    pub const RGBA8: &str = "rgba8";
    pub const BGR8: &str = "bgr8";
    pub const BGRA8: &str = "bgra8";
    pub const MONO8: &str = "mono8";
    pub const MONO16: &str = "mono16";
    /// 32-bit float, single channel (depth in meters)
    pub const TYPE_32FC1: &str = "32FC1";
    pub const BAYER_BGGR8: &str = "bayer_bggr8";
    pub const BAYER_BGGR16: &str = "bayer_bggr16";
    pub const BAYER_GBRG8: &str = "bayer_gbrg8";
    pub const BAYER_GBRG16: &str = "bayer_gbrg16";
    pub const BAYER_GRBG8: &str = "bayer_grbg8";
    pub const BAYER_GRBG16: &str = "bayer_grbg16";
    pub const BAYER_RGGB8: &str = "bayer_rggb8";
    pub const BAYER_RGGB16: &str = "bayer_rggb16";
}

/// Common message header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Capture timestamp (seconds)
    pub stamp: f64,

    /// Coordinate frame this message is expressed in
    pub frame_id: FrameId,
}

/// Image message published on an image topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMessage {
    pub header: MessageHeader,

    /// Image width (pixels)
    pub width: u32,

    /// Image height (pixels)
    pub height: u32,

    /// Row stride (bytes)
    pub step: u32,

    /// Transport encoding tag (see [`encoding`])
    pub encoding: String,

    /// Byte order flag; this relay always publishes little-endian
    pub is_bigendian: bool,

    /// Pixel data, copied once out of the capture buffer
    pub data: Bytes,
}

/// Region of interest; always zeroed (no ROI support).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub x_offset: u32,
    pub y_offset: u32,
    pub width: u32,
    pub height: u32,
    pub do_rectify: bool,
}

/// Camera intrinsics message published on a camera-info topic.
///
/// Built fresh on every publish attempt; intrinsics can change if the
/// subdevice is reconfigured at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraInfo {
    pub header: MessageHeader,

    /// Capture width for this modality (pixels)
    pub width: u32,

    /// Capture height for this modality (pixels)
    pub height: u32,

    /// Distortion model identifier (only "plumb_bob" is produced)
    pub distortion_model: String,

    /// Distortion coefficients (k1, k2, t1, t2, k3)
    pub d: [f64; 5],

    /// Intrinsic camera matrix, row-major
    pub k: [f64; 9],

    /// Rectification matrix; identity (monocular streams, no stereo pair)
    pub r: [f64; 9],

    /// Projection matrix, row-major
    pub p: [f64; 12],

    /// Binning; always zero (no binning support)
    pub binning_x: u32,
    pub binning_y: u32,

    /// Region of interest; always zeroed
    pub roi: RegionOfInterest,
}

/// A message bound for one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelayMessage {
    Image(ImageMessage),
    Info(CameraInfo),
}

impl RelayMessage {
    /// Capture stamp of the contained message.
    pub fn stamp(&self) -> f64 {
        match self {
            RelayMessage::Image(msg) => msg.header.stamp,
            RelayMessage::Info(msg) => msg.header.stamp,
        }
    }

    /// Short kind label (used for logging/metrics).
    pub fn kind(&self) -> &'static str {
        match self {
            RelayMessage::Image(_) => "image",
            RelayMessage::Info(_) => "info",
        }
    }
}
