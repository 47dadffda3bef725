//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::ShipperConfig;

use crate::error::CliError;

/// Load and validate a configuration file
fn load_config(path: &Path) -> Result<ShipperConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Non-fatal configuration issues worth telling the operator about
fn collect_warnings(config: &ShipperConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.enabled_sink_count() == 0 {
        warnings.push("No sinks enabled - records will be read and discarded".to_string());
    }

    if config.source.kind == contracts::SourceKind::Queue && !cfg!(feature = "kafka") {
        warnings.push(
            "Queue source configured but this build lacks the `kafka` feature".to_string(),
        );
    }

    if let Some(file) = &config.sinks.file {
        if file.max_size_bytes <= 0 && !file.rotate_daily {
            warnings.push(format!(
                "File sink '{}' has no rotation - a single file grows without bound",
                file.filename_prefix
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FileSinkConfig, SinksConfig};

    fn mock_config() -> ShipperConfig {
        config_loader::ConfigLoader::load_from_str(
            r#"
            [source]
            kind = "mock"
            "#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap()
    }

    #[test]
    fn test_warns_without_sinks() {
        let config = mock_config();
        let warnings = collect_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("No sinks enabled")));
    }

    #[test]
    fn test_warns_on_unbounded_file() {
        let mut config = mock_config();
        config.sinks = SinksConfig {
            console: true,
            file: Some(FileSinkConfig {
                path: "/tmp/logs".to_string(),
                filename_prefix: "app".to_string(),
                max_size_bytes: 0,
                rotate_daily: false,
            }),
            ..SinksConfig::default()
        };

        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("no rotation"));
    }

    #[test]
    fn test_queue_warning_follows_kafka_feature() {
        let config = config_loader::ConfigLoader::load_from_str(
            r#"
            [source]
            kind = "queue"
            brokers = ["127.0.0.1:9092"]
            topic = "app-log"

            [sinks]
            console = true
            "#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let warnings = collect_warnings(&config);
        let flagged = warnings.iter().any(|w| w.contains("`kafka` feature"));
        assert_eq!(flagged, !cfg!(feature = "kafka"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
