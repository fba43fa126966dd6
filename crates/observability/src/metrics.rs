//! Relay metric recording
//!
//! Free functions the relay hot path calls per tick, plus an in-memory
//! aggregator for end-of-run summaries.

use metrics::{counter, gauge, histogram};

/// Record one scheduler tick.
pub fn record_tick() {
    counter!("rgbd_relay_ticks_total").increment(1);
}

/// Record wall-clock cost of one tick.
pub fn record_tick_duration_ms(duration_ms: f64) {
    histogram!("rgbd_relay_tick_duration_ms").record(duration_ms);
}

/// Record a published image frame for one modality.
pub fn record_frame_published(modality: &str) {
    counter!(
        "rgbd_relay_frames_published_total",
        "modality" => modality.to_string()
    )
    .increment(1);
}

/// Record a frame dropped by the freshness gate.
pub fn record_frame_stale(modality: &str) {
    counter!(
        "rgbd_relay_frames_stale_total",
        "modality" => modality.to_string()
    )
    .increment(1);
}

/// Record a failed capture (no frame pair this tick).
pub fn record_capture_error() {
    counter!("rgbd_relay_capture_errors_total").increment(1);
}

/// Record a skipped camera-info publication for one modality.
pub fn record_intrinsics_error(modality: &str) {
    counter!(
        "rgbd_relay_intrinsics_errors_total",
        "modality" => modality.to_string()
    )
    .increment(1);
}

/// Record a tick on which the sensor reported an error status.
pub fn record_sensor_fault() {
    counter!("rgbd_relay_sensor_faults_total").increment(1);
}

/// Record the current consecutive not-ready wait counter.
pub fn record_wait_ticks(waited: u32) {
    gauge!("rgbd_relay_wait_ticks").set(waited as f64);
}

/// Record a pixel format that fell back to the RGB-8 default.
pub fn record_encoding_fallback() {
    counter!("rgbd_relay_encoding_fallback_total").increment(1);
}

/// Per-run publish aggregator
///
/// Aggregates counts in memory so the host can print a summary at shutdown.
#[derive(Debug, Clone, Default)]
pub struct RelayMetricsAggregator {
    /// Total scheduler ticks
    pub total_ticks: u64,

    /// Published image frames per modality
    pub color_published: u64,
    pub depth_published: u64,

    /// Frames rejected by the freshness gate
    pub color_stale: u64,
    pub depth_stale: u64,

    /// Failed captures
    pub capture_errors: u64,

    /// Skipped camera-info publications
    pub intrinsics_errors: u64,

    /// Tick duration statistics (milliseconds)
    pub tick_stats: RunningStats,
}

impl RelayMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick's wall-clock cost
    pub fn record_tick(&mut self, duration_ms: f64) {
        self.total_ticks += 1;
        self.tick_stats.push(duration_ms);
    }

    /// Generate a summary report
    pub fn summary(&self) -> PublishSummary {
        PublishSummary {
            total_ticks: self.total_ticks,
            color_published: self.color_published,
            depth_published: self.depth_published,
            color_stale: self.color_stale,
            depth_stale: self.depth_stale,
            capture_errors: self.capture_errors,
            intrinsics_errors: self.intrinsics_errors,
            tick_duration_ms: StatsSummary::from(&self.tick_stats),
        }
    }

    /// Reset all counts
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Publish summary
#[derive(Debug, Clone, Default)]
pub struct PublishSummary {
    pub total_ticks: u64,
    pub color_published: u64,
    pub depth_published: u64,
    pub color_stale: u64,
    pub depth_stale: u64,
    pub capture_errors: u64,
    pub intrinsics_errors: u64,
    pub tick_duration_ms: StatsSummary,
}

impl std::fmt::Display for PublishSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Relay Publish Summary ===")?;
        writeln!(f, "Total ticks: {}", self.total_ticks)?;
        writeln!(
            f,
            "Color frames: {} published, {} stale",
            self.color_published, self.color_stale
        )?;
        writeln!(
            f,
            "Depth frames: {} published, {} stale",
            self.depth_published, self.depth_stale
        )?;
        writeln!(f, "Capture errors: {}", self.capture_errors)?;
        writeln!(f, "Intrinsics errors: {}", self.intrinsics_errors)?;
        writeln!(f, "Tick duration (ms): {}", self.tick_duration_ms)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
