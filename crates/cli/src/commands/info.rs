//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    node: NodeInfo,
    period_ms: u64,
    force_info_sync: bool,
    topics: TopicsInfo,
    transport: TransportInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    subdevice: Option<SubdeviceInfo>,
}

#[derive(Serialize)]
struct NodeInfo {
    name: String,
    frame_id: String,
}

#[derive(Serialize)]
struct TopicsInfo {
    color_image: String,
    depth_image: String,
    color_info: String,
    depth_info: String,
}

#[derive(Serialize)]
struct TransportInfo {
    kind: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

#[derive(Serialize)]
struct SubdeviceInfo {
    kind: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &contracts::RelayConfig) -> ConfigInfo {
    ConfigInfo {
        node: NodeInfo {
            name: config.node.name.clone(),
            frame_id: config.node.frame_id.clone(),
        },
        period_ms: config.period_ms,
        force_info_sync: config.force_info_sync,
        topics: TopicsInfo {
            color_image: config.topics.color_image.clone(),
            depth_image: config.topics.depth_image.clone(),
            color_info: config.topics.color_info.clone(),
            depth_info: config.topics.depth_info.clone(),
        },
        transport: TransportInfo {
            kind: format!("{:?}", config.transport.kind),
            queue_capacity: config.transport.queue_capacity,
            params: config.transport.params.clone(),
        },
        subdevice: config.subdevice.as_ref().map(|s| SubdeviceInfo {
            kind: s.kind.clone(),
            params: s.params.clone(),
        }),
    }
}

fn print_config_info(config: &contracts::RelayConfig, args: &InfoArgs) {
    println!("Node: {} (frame: {})", config.node.name, config.node.frame_id);
    println!(
        "Cadence: {} ms, force_info_sync: {}",
        config.period_ms, config.force_info_sync
    );
    println!(
        "Transport: {:?} (queue depth {})",
        config.transport.kind, config.transport.queue_capacity
    );

    if args.topics {
        println!("\nTopics:");
        println!("  Color image: {}", config.topics.color_image);
        println!("  Depth image: {}", config.topics.depth_image);
        println!("  Color info:  {}", config.topics.color_info);
        println!("  Depth info:  {}", config.topics.depth_info);
    }

    if args.subdevice {
        match &config.subdevice {
            Some(subdevice) => {
                println!("\nSubdevice (relay-owned): {}", subdevice.kind);
                for (key, value) in &subdevice.params {
                    println!("  {key} = {value}");
                }
            }
            None => println!("\nSubdevice: none (source supplied via attachment)"),
        }
    }
}
