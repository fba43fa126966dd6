//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// RGB-D Relay - fixed-cadence sensor to pub/sub bridge
#[derive(Parser, Debug)]
#[command(
    name = "rgbd-relay",
    author,
    version,
    about = "RGB-D sensor to pub/sub relay",
    long_about = "Relays frames from an RGB-D sensor source to a publish/subscribe \n\
                  transport at a fixed cadence, translating pixel formats and \n\
                  camera-intrinsics metadata into a standardized wire representation."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RGBD_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RGBD_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "relay.toml", env = "RGBD_RELAY_CONFIG")]
    pub config: PathBuf,

    /// Override publish period from configuration (milliseconds)
    #[arg(long, env = "RGBD_RELAY_PERIOD_MS")]
    pub period_ms: Option<u64>,

    /// Force camera-info messages to borrow the paired image timestamp
    #[arg(long)]
    pub force_info_sync: bool,

    /// Maximum color frames to publish before stopping (0 = unlimited)
    #[arg(long, default_value = "0", env = "RGBD_RELAY_MAX_FRAMES")]
    pub max_frames: u64,

    /// Run duration in seconds (0 = run until interrupted)
    #[arg(long, default_value = "0", env = "RGBD_RELAY_DURATION")]
    pub duration: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "RGBD_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show topic routing details
    #[arg(long)]
    pub topics: bool,

    /// Show subdevice configuration
    #[arg(long)]
    pub subdevice: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
