//! Relay run statistics.

use std::time::Duration;

use observability::PublishSummary;
use transport::MetricsSnapshot;

/// Statistics from a relay run
#[derive(Debug, Clone, Default)]
pub struct RelayStats {
    /// Total duration of the run
    pub duration: Duration,

    /// Relay-side publish summary (ticks, per-modality counts)
    pub publish: PublishSummary,

    /// Per-topic transport metrics
    pub topics: Vec<(String, MetricsSnapshot)>,
}

impl RelayStats {
    /// Published color frames per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.publish.color_published as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Relay Run Statistics ===\n");

        println!("Overview");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Ticks: {}", self.publish.total_ticks);
        println!("  Color FPS: {:.2}", self.fps());

        print!("{}", self.publish);

        if !self.topics.is_empty() {
            println!("\nTopics");
            for (topic, snapshot) in &self.topics {
                println!(
                    "  {} - published: {}, dropped: {}, failures: {}",
                    topic, snapshot.publish_count, snapshot.dropped_count, snapshot.failure_count
                );
            }
        }

        println!();
    }
}
