//! # Relay
//!
//! The acquisition-and-publish core: polls an attached RGB-D source at a
//! fixed cadence, deduplicates frames per modality on producer timestamps,
//! translates pixel formats and camera intrinsics to their wire
//! representation, and publishes image + camera-info streams through
//! injected topic publishers.
//!
//! Nothing in this crate raises past a tick boundary: every runtime failure
//! is converted to a logged, classified outcome and the scheduler keeps
//! running.

pub mod encoding;

mod cycle;
mod gate;
mod intrinsics;
mod service;
mod status;

pub use cycle::{AcquisitionCycle, CycleCounters, CyclePublishers};
pub use gate::StampGate;
pub use intrinsics::extract_camera_info;
pub use service::{run_tick, RgbdRelay};
pub use status::{StatusMonitor, TickDecision, WaitAnnounce};
