//! Lifecycle/attachment service
//!
//! Binds/unbinds the external sensor handle and owns the periodic
//! acquisition task. Ordering is attach-then-start and stop-then-detach:
//! the worker only ever observes a bound handle, and any in-flight tick is
//! awaited before the handle is cleared.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use contracts::{FrameId, RelayConfig, RelayError, RgbdSensor};
use observability::{
    record_capture_error, record_sensor_fault, record_tick, record_tick_duration_ms,
    record_wait_ticks, PublishSummary, RelayMetricsAggregator,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::cycle::{AcquisitionCycle, CyclePublishers};
use crate::status::{StatusMonitor, TickDecision, WaitAnnounce};

/// Run one tick: poll status, decide, and act.
///
/// Split out of the periodic task so scenario tests can drive ticks
/// deterministically. `None` for the sensor models an unbound handle.
pub fn run_tick(
    sensor: Option<&dyn RgbdSensor>,
    monitor: &mut StatusMonitor,
    cycle: &mut AcquisitionCycle,
    stats: &mut RelayMetricsAggregator,
) -> TickDecision {
    record_tick();
    let started = Instant::now();

    let decision = monitor.assess(sensor.map(|s| s.status()));
    match decision {
        TickDecision::Capture => {
            if let Some(sensor) = sensor {
                if let Err(e) = cycle.run(sensor) {
                    error!(error = %e, "Image not captured, check sensor configuration");
                    record_capture_error();
                    stats.capture_errors += 1;
                }
            }
        }
        TickDecision::Wait(announce) => {
            record_wait_ticks(monitor.waited());
            match announce {
                WaitAnnounce::Info => info!("Sensor not ready, waiting..."),
                WaitAnnounce::Warn => warn!("Sensor is taking too long to start"),
                WaitAnnounce::Quiet => {}
            }
        }
        TickDecision::Fault => {
            error!("Sensor returned error status");
            record_sensor_fault();
        }
        TickDecision::NoSensor => {
            error!("Sensor interface is not valid");
        }
    }

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    record_tick_duration_ms(elapsed_ms);
    stats.record_tick(elapsed_ms);

    // Mirror the cycle's absolute counters into the aggregator
    let counters = cycle.counters();
    stats.color_published = counters.color_published;
    stats.depth_published = counters.depth_published;
    stats.color_stale = counters.color_stale;
    stats.depth_stale = counters.depth_stale;
    stats.intrinsics_errors = counters.intrinsics_errors;

    decision
}

struct CycleWorker {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// The relay service: one optional sensor handle, one periodic task.
pub struct RgbdRelay {
    frame_id: FrameId,
    period: Duration,
    force_info_sync: bool,
    owns_source: bool,
    publishers: CyclePublishers,
    sensor: Option<Arc<dyn RgbdSensor>>,
    worker: Option<CycleWorker>,
    stats: Arc<Mutex<RelayMetricsAggregator>>,
}

impl RgbdRelay {
    /// Create a relay from validated configuration and injected publishers.
    ///
    /// A configured subdevice marks the source as relay-owned, which makes
    /// [`detach`](Self::detach) refuse until [`close`](Self::close).
    pub fn new(config: &RelayConfig, publishers: CyclePublishers) -> Self {
        Self {
            frame_id: FrameId::new(&config.node.frame_id),
            period: config.period(),
            force_info_sync: config.force_info_sync,
            owns_source: config.subdevice.is_some(),
            publishers,
            sensor: None,
            worker: None,
            stats: Arc::new(Mutex::new(RelayMetricsAggregator::new())),
        }
    }

    /// Publish summary for the current run.
    pub fn stats(&self) -> PublishSummary {
        self.stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .summary()
    }

    /// Bind a sensor handle and start the periodic task.
    ///
    /// `None` (a loader that failed to resolve the interface) is rejected
    /// with `InvalidHandle`. Attaching while already attached silently
    /// replaces the handle: the running task is stopped first, then
    /// restarted against the new source with fresh gates.
    #[instrument(name = "relay_attach", skip(self, sensor))]
    pub async fn attach(&mut self, sensor: Option<Arc<dyn RgbdSensor>>) -> Result<(), RelayError> {
        let sensor = match sensor {
            Some(sensor) => sensor,
            None => {
                error!("Attached device has no valid rgbd sensor interface");
                return Err(RelayError::InvalidHandle);
            }
        };

        if self.worker.is_some() {
            debug!("Already attached, replacing sensor handle");
            self.stop_worker().await;
        }

        self.sensor = Some(sensor);
        self.start_worker();
        Ok(())
    }

    /// Stop the periodic task and clear the bound handle.
    ///
    /// Refused while the relay was configured to own and construct its own
    /// source; lifecycle symmetry then requires [`close`](Self::close).
    #[instrument(name = "relay_detach", skip(self))]
    pub async fn detach(&mut self) -> Result<(), RelayError> {
        if self.owns_source {
            error!("Detach refused, sensor source is owned by the relay");
            return Err(RelayError::OwnershipConflict);
        }

        self.stop_worker().await;
        self.sensor = None;
        Ok(())
    }

    /// Unconditional teardown, symmetric with construction.
    ///
    /// Stops the periodic task and drops the handle, including a
    /// relay-owned source.
    #[instrument(name = "relay_close", skip(self))]
    pub async fn close(&mut self) {
        self.stop_worker().await;
        self.sensor = None;
        self.owns_source = false;
        debug!("Relay closed");
    }

    /// Whether a sensor handle is currently bound.
    pub fn is_attached(&self) -> bool {
        self.sensor.is_some()
    }

    /// Whether the periodic task is running.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    fn start_worker(&mut self) {
        let sensor = match &self.sensor {
            Some(sensor) => Arc::clone(sensor),
            None => return,
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        let cycle = AcquisitionCycle::new(
            self.frame_id.clone(),
            self.force_info_sync,
            self.publishers.clone(),
        );
        let period = self.period;

        // Stats cover one run; a replaced handle starts over
        let stats = Arc::clone(&self.stats);
        stats.lock().unwrap_or_else(|e| e.into_inner()).reset();

        let handle = tokio::spawn(async move {
            cycle_loop(sensor, cycle, period, stop_rx, stats).await;
        });

        info!(period_ms = self.period.as_millis() as u64, "Periodic acquisition started");
        self.worker = Some(CycleWorker { stop_tx, handle });
    }

    async fn stop_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            // Signal, then wait for any in-flight tick to finish
            let _ = worker.stop_tx.send(true);
            if let Err(e) = worker.handle.await {
                error!(error = ?e, "Cycle task panicked");
            }
            debug!("Periodic acquisition stopped");
        }
    }
}

/// Periodic task body: one full tick per period, no overlap, no queuing.
async fn cycle_loop(
    sensor: Arc<dyn RgbdSensor>,
    mut cycle: AcquisitionCycle,
    period: Duration,
    mut stop_rx: watch::Receiver<bool>,
    stats: Arc<Mutex<RelayMetricsAggregator>>,
) {
    let mut monitor = StatusMonitor::new();
    let mut interval = tokio::time::interval(period);
    // A slow tick delays the next one instead of bursting to catch up
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = stop_rx.changed() => break,
            _ = interval.tick() => {
                let mut stats = stats.lock().unwrap_or_else(|e| e.into_inner());
                run_tick(Some(sensor.as_ref()), &mut monitor, &mut cycle, &mut stats);
            }
        }
    }

    debug!(ticks = cycle.ticks(), "Cycle loop exited");
}
