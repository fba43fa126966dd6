//! Acquisition-publish cycle
//!
//! One `run()` is one tick of the periodic schedule: pull a frame pair,
//! gate each modality on freshness, publish the image message, then the
//! camera-info message. Color and depth are fully independent; failure of
//! one never blocks or rolls back the other.

use contracts::{
    FrameId, ImageMessage, MessageHeader, Modality, PixelCode, RelayError, RelayMessage, RgbdImage,
    RgbdSensor,
};
use observability::{
    record_encoding_fallback, record_frame_published, record_frame_stale, record_intrinsics_error,
};
use tracing::{debug, trace, warn};
use transport::TopicPublisher;

use crate::encoding::encoding_for;
use crate::gate::StampGate;
use crate::intrinsics::extract_camera_info;

/// The four outbound channels, injected at construction.
#[derive(Clone)]
pub struct CyclePublishers {
    pub color_image: TopicPublisher,
    pub depth_image: TopicPublisher,
    pub color_info: TopicPublisher,
    pub depth_info: TopicPublisher,
}

/// Per-run publish counts, mirrored into the host's stats aggregator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleCounters {
    pub color_published: u64,
    pub depth_published: u64,
    pub color_stale: u64,
    pub depth_stale: u64,
    pub intrinsics_errors: u64,
}

/// Per-run cycle state: freshness gates, sync policy, diagnostic counter.
pub struct AcquisitionCycle {
    frame_id: FrameId,
    force_info_sync: bool,
    color_gate: StampGate,
    depth_gate: StampGate,
    publishers: CyclePublishers,
    counters: CycleCounters,
    /// Diagnostic tick counter; never carried into outbound messages
    seq: u64,
}

impl AcquisitionCycle {
    /// Create a cycle with fresh gates.
    pub fn new(frame_id: FrameId, force_info_sync: bool, publishers: CyclePublishers) -> Self {
        Self {
            frame_id,
            force_info_sync,
            color_gate: StampGate::new(),
            depth_gate: StampGate::new(),
            publishers,
            counters: CycleCounters::default(),
            seq: 0,
        }
    }

    /// Run one tick against the bound source.
    ///
    /// # Errors
    /// Returns a capture error when the source produced no frame pair; the
    /// caller logs it and retries on its next tick. Everything after a
    /// successful capture is converted to logged outcomes internally.
    pub fn run(&mut self, sensor: &dyn RgbdSensor) -> Result<(), RelayError> {
        let pair = sensor.frame_pair()?;

        self.relay_modality(sensor, Modality::Color, pair.color, pair.color_stamp);
        self.relay_modality(sensor, Modality::Depth, pair.depth, pair.depth_stamp);

        self.seq = self.seq.wrapping_add(1);
        trace!(seq = self.seq, "cycle tick complete");
        Ok(())
    }

    /// Number of completed ticks (diagnostic).
    pub fn ticks(&self) -> u64 {
        self.seq
    }

    /// Publish counts for this run.
    pub fn counters(&self) -> CycleCounters {
        self.counters
    }

    fn relay_modality(
        &mut self,
        sensor: &dyn RgbdSensor,
        modality: Modality,
        image: RgbdImage,
        stamp: f64,
    ) {
        let gate = match modality {
            Modality::Color => &mut self.color_gate,
            Modality::Depth => &mut self.depth_gate,
        };
        if !gate.accept(stamp) {
            debug!(%modality, stamp, "repeated timestamp, frame not published");
            record_frame_stale(modality.label());
            match modality {
                Modality::Color => self.counters.color_stale += 1,
                Modality::Depth => self.counters.depth_stale += 1,
            }
            return;
        }

        if matches!(image.pixel_code, PixelCode::Unknown(_)) {
            record_encoding_fallback();
        }

        let message = build_image_message(&self.frame_id, stamp, image);
        let (image_pub, info_pub) = match modality {
            Modality::Color => (&self.publishers.color_image, &self.publishers.color_info),
            Modality::Depth => (&self.publishers.depth_image, &self.publishers.depth_info),
        };

        image_pub.publish(RelayMessage::Image(message));
        record_frame_published(modality.label());
        match modality {
            Modality::Color => self.counters.color_published += 1,
            Modality::Depth => self.counters.depth_published += 1,
        }

        // Intrinsics are rebuilt per publish; failure skips only this
        // modality's info message - the image above is already out
        match extract_camera_info(sensor, modality, &self.frame_id) {
            Ok(mut info) => {
                if self.force_info_sync {
                    info.header.stamp = stamp;
                }
                info_pub.publish(RelayMessage::Info(info));
            }
            Err(e) => {
                warn!(
                    %modality,
                    error = %e,
                    "Missing camera parameters, camera info message will not be sent"
                );
                record_intrinsics_error(modality.label());
                self.counters.intrinsics_errors += 1;
            }
        }
    }
}

/// Build the outbound image message; the payload is copied out of the
/// capture buffer exactly once (reference-counted from here on).
fn build_image_message(frame_id: &FrameId, stamp: f64, image: RgbdImage) -> ImageMessage {
    ImageMessage {
        header: MessageHeader {
            stamp,
            frame_id: frame_id.clone(),
        },
        width: image.width,
        height: image.height,
        step: image.step,
        encoding: encoding_for(image.pixel_code).to_string(),
        is_bigendian: false,
        data: image.data,
    }
}
