//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::ShipperConfig;
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    source: String,
    buffer_size: usize,
    sinks: Vec<SinkInfo>,
    /// Effective configuration with every default filled in
    config: ShipperConfig,
}

#[derive(Serialize)]
struct SinkInfo {
    name: &'static str,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = load_config(&args.config)?;

    if args.json {
        let info = build_config_info(config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        let effective = config_loader::ConfigLoader::to_toml(&config)
            .context("Failed to render effective configuration")?;
        print_config_info(&config, &effective);
    }

    Ok(())
}

fn sink_infos(config: &ShipperConfig) -> Vec<SinkInfo> {
    let mut sinks = Vec::new();
    if config.sinks.console {
        sinks.push(SinkInfo {
            name: "console",
            queue_capacity: config.sinks.queue_capacity,
            target: None,
        });
    }
    if let Some(ref file) = config.sinks.file {
        sinks.push(SinkInfo {
            name: "file",
            queue_capacity: config.sinks.queue_capacity,
            target: Some(format!("{}/{}*.log", file.path, file.filename_prefix)),
        });
    }
    sinks
}

fn build_config_info(config: ShipperConfig) -> ConfigInfo {
    ConfigInfo {
        source: config.source.display_name(),
        buffer_size: config.buffer_size,
        sinks: sink_infos(&config),
        config,
    }
}

fn print_config_info(config: &ShipperConfig, effective: &str) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  logship Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📥 Source");
    println!("   ├─ Name: {}", config.source.display_name());
    println!("   └─ Kind: {:?}", config.source.kind);

    println!("\n📦 Buffer");
    println!("   └─ Capacity: {}", config.buffer_size);

    let sinks = sink_infos(config);
    println!("\n📤 Sinks ({})", sinks.len());
    for (i, sink) in sinks.iter().enumerate() {
        let prefix = if i == sinks.len() - 1 { "└─" } else { "├─" };
        match &sink.target {
            Some(target) => println!("   {} {} -> {}", prefix, sink.name, target),
            None => println!("   {} {}", prefix, sink.name),
        }
    }

    println!("\n⚙️  Effective configuration\n");
    println!("{effective}");
}
