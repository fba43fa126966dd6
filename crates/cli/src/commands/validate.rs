//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    node_name: String,
    frame_id: String,
    period_ms: u64,
    force_info_sync: bool,
    transport_kind: String,
    subdevice_kind: Option<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    node_name: config.node.name.clone(),
                    frame_id: config.node.frame_id.clone(),
                    period_ms: config.period_ms,
                    force_info_sync: config.force_info_sync,
                    transport_kind: format!("{:?}", config.transport.kind),
                    subdevice_kind: config.subdevice.as_ref().map(|s| s.kind.clone()),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &contracts::RelayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.subdevice.is_none() {
        warnings.push(
            "No subdevice configured - the run command attaches the built-in test pattern source"
                .to_string(),
        );
    }

    if config.transport.kind == contracts::SinkKind::Log {
        warnings
            .push("Log transport selected - messages are summarized, not delivered".to_string());
    }

    if config.period_ms > 1000 {
        warnings.push(format!(
            "Publish period is {} ms - subscribers will see below 1 Hz",
            config.period_ms
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Node: {}", summary.node_name);
            println!("  Frame id: {}", summary.frame_id);
            println!("  Period: {} ms", summary.period_ms);
            println!("  Force info sync: {}", summary.force_info_sync);
            println!("  Transport: {}", summary.transport_kind);
            match &summary.subdevice_kind {
                Some(kind) => println!("  Subdevice: {kind}"),
                None => println!("  Subdevice: none"),
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\nWarnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
