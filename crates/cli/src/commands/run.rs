//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::runtime::{Runtime, RuntimeConfig};

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(period_ms) = args.period_ms {
        info!(period_ms, "Overriding publish period from CLI");
        config.period_ms = period_ms;
    }
    if args.force_info_sync {
        info!("Forcing camera-info timestamp sync from CLI");
        config.force_info_sync = true;
    }

    info!(
        node = %config.node.name,
        frame_id = %config.node.frame_id,
        period_ms = config.period_ms,
        force_info_sync = config.force_info_sync,
        transport = ?config.transport.kind,
        subdevice = config.subdevice.as_ref().map(|s| s.kind.as_str()),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    // Build runtime configuration
    let runtime_config = RuntimeConfig {
        config,
        max_frames: if args.max_frames == 0 {
            None
        } else {
            Some(args.max_frames)
        },
        duration: if args.duration == 0 {
            None
        } else {
            Some(Duration::from_secs(args.duration))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let runtime = Runtime::new(runtime_config);

    info!("Starting relay...");

    // The shutdown future resolves on Ctrl+C / SIGTERM; the runtime tears
    // everything down before returning
    let stats = runtime.run(shutdown_signal()).await?;

    info!(
        duration_secs = stats.duration.as_secs_f64(),
        ticks = stats.publish.total_ticks,
        fps = format!("{:.2}", stats.fps()),
        "Relay completed"
    );

    stats.print_summary();

    info!("RGB-D Relay finished");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Received shutdown signal, stopping relay...");
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &contracts::RelayConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Node:");
    println!("  Name: {}", config.node.name);
    println!("  Frame id: {}", config.node.frame_id);
    println!("  Period: {} ms", config.period_ms);
    println!("  Force info sync: {}", config.force_info_sync);

    println!("\nTopics:");
    println!("  Color image: {}", config.topics.color_image);
    println!("  Depth image: {}", config.topics.depth_image);
    println!("  Color info:  {}", config.topics.color_info);
    println!("  Depth info:  {}", config.topics.depth_info);

    println!("\nTransport:");
    println!("  Kind: {:?}", config.transport.kind);
    println!("  Queue capacity: {}", config.transport.queue_capacity);

    match &config.subdevice {
        Some(subdevice) => {
            println!("\nSubdevice (relay-owned):");
            println!("  Kind: {}", subdevice.kind);
            for (key, value) in &subdevice.params {
                println!("  {key}: {value}");
            }
        }
        None => {
            println!("\nSubdevice: none (source supplied via attachment)");
        }
    }

    println!();
}
