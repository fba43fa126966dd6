//! Sensor status monitor
//!
//! Level-triggered: the decision is recomputed from the polled status every
//! tick; the only state carried across ticks is the not-ready wait counter,
//! which resets the instant the source reports Ok.

use contracts::SensorStatus;

/// Wait ticks before "not ready" escalates from periodic info to a
/// per-tick warning.
pub const WAIT_ESCALATION_TICKS: u32 = 1000;

/// Cadence of informational announcements below the escalation threshold.
pub const WAIT_ANNOUNCE_EVERY: u32 = 30;

/// How loudly a wait tick should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitAnnounce {
    /// Say nothing this tick
    Quiet,
    /// Informational "waiting..." announcement
    Info,
    /// Escalated "taking too long" warning
    Warn,
}

/// What this tick should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// No handle bound; report a hard error, do not attempt capture
    NoSensor,
    /// Source is streaming; run the acquisition-publish cycle
    Capture,
    /// Source not ready yet; skip capture, announce per the cadence
    Wait(WaitAnnounce),
    /// Source reported an explicit error status
    Fault,
}

/// Per-run status monitor.
#[derive(Debug, Default)]
pub struct StatusMonitor {
    waited: u32,
}

impl StatusMonitor {
    /// Create a monitor with a zeroed wait counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the polled status for this tick.
    ///
    /// `None` means no handle is bound. Only an Ok status resets the wait
    /// counter; NoSensor and Fault leave it untouched.
    pub fn assess(&mut self, status: Option<SensorStatus>) -> TickDecision {
        match status {
            None => TickDecision::NoSensor,
            Some(SensorStatus::Ok) => {
                self.waited = 0;
                TickDecision::Capture
            }
            Some(SensorStatus::NotReady) => {
                let announce = if self.waited < WAIT_ESCALATION_TICKS {
                    if self.waited % WAIT_ANNOUNCE_EVERY == 0 {
                        WaitAnnounce::Info
                    } else {
                        WaitAnnounce::Quiet
                    }
                } else {
                    WaitAnnounce::Warn
                };
                self.waited = self.waited.saturating_add(1);
                TickDecision::Wait(announce)
            }
            Some(SensorStatus::Error) => TickDecision::Fault,
        }
    }

    /// Consecutive not-ready ticks observed since the last Ok.
    pub fn waited(&self) -> u32 {
        self.waited
    }
}
