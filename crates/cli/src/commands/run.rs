//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{CancellationToken, ShipperConfig};
use tracing::{error, info, warn};

use super::{collect_warnings, load_config};
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::Pipeline;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut config = load_config(&args.config)?;

    apply_overrides(&mut config, args);
    config_loader::ConfigLoader::validate(&config)
        .map_err(|e| CliError::config_validation(e.to_string()))?;

    info!(
        source = %config.source.display_name(),
        buffer_size = config.buffer_size,
        sinks = config.enabled_sink_count(),
        "Configuration loaded"
    );
    for warning in collect_warnings(&config) {
        warn!("{warning}");
    }

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping pipeline...");
        signal_cancel.cancel();
    });

    info!("Starting pipeline...");

    let stats = Pipeline::new(config)
        .run(cancel)
        .await
        .context("Pipeline execution failed")?;

    info!(
        records = stats.records_dispatched,
        reason = ?stats.stop_reason,
        duration_secs = stats.duration.as_secs_f64(),
        rate = format!("{:.2}", stats.rate()),
        "Pipeline finished"
    );
    stats.print_summary();

    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut ShipperConfig, args: &RunArgs) {
    if !args.brokers.is_empty() {
        info!(brokers = ?args.brokers, "Overriding brokers from CLI");
        config.source.brokers = args.brokers.clone();
    }
    if let Some(ref topic) = args.topic {
        info!(topic = %topic, "Overriding topic from CLI");
        config.source.topic = topic.clone();
    }
    if let Some(ref group_id) = args.group_id {
        info!(group_id = %group_id, "Overriding consumer group from CLI");
        config.source.group_id = group_id.clone();
    }
    if let Some(buffer_size) = args.buffer_size {
        info!(buffer_size, "Overriding buffer size from CLI");
        config.buffer_size = buffer_size;
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &ShipperConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Source: {} ({:?})", config.source.display_name(), config.source.kind);
    if !config.source.brokers.is_empty() {
        println!("  Brokers: {}", config.source.brokers.join(","));
        println!("  Topic: {}", config.source.topic);
        println!("  Group: {}", config.source.group_id);
    }
    println!("Buffer size: {}", config.buffer_size);

    println!("\nSinks ({}):", config.enabled_sink_count());
    if config.sinks.console {
        println!("  - console");
    }
    if let Some(ref file) = config.sinks.file {
        println!(
            "  - file: {}/{} (max {} bytes, daily: {})",
            file.path, file.filename_prefix, file.max_size_bytes, file.rotate_daily
        );
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        run: RunArgs,
    }

    fn queue_config() -> ShipperConfig {
        config_loader::ConfigLoader::load_from_str(
            r#"
            [source]
            kind = "queue"
            brokers = ["kafka-1:9092"]
            topic = "app-log"
            "#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap()
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let harness = Harness::parse_from([
            "logship",
            "--brokers",
            "a:9092,b:9092",
            "--topic",
            "audit",
            "--buffer-size",
            "16",
        ]);
        let mut config = queue_config();

        apply_overrides(&mut config, &harness.run);

        assert_eq!(config.source.brokers, vec!["a:9092", "b:9092"]);
        assert_eq!(config.source.topic, "audit");
        assert_eq!(config.source.group_id, contracts::DEFAULT_GROUP_ID);
        assert_eq!(config.buffer_size, 16);
        assert_eq!(harness.run.config, PathBuf::from("logship.toml"));
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let harness = Harness::parse_from(["logship"]);
        let mut config = queue_config();

        apply_overrides(&mut config, &harness.run);

        assert_eq!(config.source.brokers, vec!["kafka-1:9092"]);
        assert_eq!(config.buffer_size, 1024);
    }
}
