//! Captured frame data - sensor-side image representation
//!
//! Raw image structures as produced by an attached RGB-D source.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Sensor-side pixel format vocabulary.
///
/// These are the codes an attached source reports for its buffers. They are
/// translated to transport encoding tags before publication; codes outside
/// this vocabulary are carried as `Unknown` and fall back to RGB-8 on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelCode {
    Bgr8,
    Bgra8,
    Rgb8,
    Rgba8,
    Mono8,
    Mono16,
    MonoFloat,
    BayerBggr8,
    BayerBggr16,
    BayerGbrg8,
    BayerGbrg16,
    BayerGrbg8,
    BayerGrbg16,
    BayerRggb8,
    BayerRggb16,
    /// Raw code reported by a source that this vocabulary does not cover.
    Unknown(u32),
}

/// One captured image for a single modality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RgbdImage {
    /// Image width (pixels)
    pub width: u32,

    /// Image height (pixels)
    pub height: u32,

    /// Row stride (bytes)
    pub step: u32,

    /// Sensor-side pixel format
    pub pixel_code: PixelCode,

    /// Raw pixel data (zero-copy)
    pub data: Bytes,
}

/// One color + depth capture, pulled atomically from the source in one call.
///
/// Color and depth carry independent producer timestamps; each modality
/// passes or fails the freshness gate on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramePair {
    /// Color image
    pub color: RgbdImage,

    /// Depth image
    pub depth: RgbdImage,

    /// Color capture timestamp (seconds)
    pub color_stamp: f64,

    /// Depth capture timestamp (seconds)
    pub depth_stamp: f64,
}
