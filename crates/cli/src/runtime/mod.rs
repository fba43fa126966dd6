//! Relay runtime orchestration.

mod orchestrator;
mod stats;

pub use orchestrator::{Runtime, RuntimeConfig};
pub use stats::RelayStats;
