use std::path::Path;
use std::process::ExitCode;

use tinymon_config::{Config, ConfigError};
use tinymon_core::Monitor;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{logging, signal};

/// 加载配置并持续监控，直到收到 SIGINT / SIGTERM
pub async fn execute(config_path: Option<&Path>, verbose: bool) -> anyhow::Result<ExitCode> {
    let loaded = match Config::load(config_path) {
        Ok(loaded) => loaded,
        Err(ConfigError::Invalid(errors)) => {
            eprintln!("Configuration error:");
            for error in errors.iter() {
                eprintln!("  - {error}");
            }
            eprintln!("\nRun 'tinymonitor validate -c <file>' for details.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            eprintln!("Configuration error:");
            eprintln!("  {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    logging::init(verbose, loaded.config.log_file());
    match &loaded.source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("No configuration file found, using defaults"),
    }

    let cancel = CancellationToken::new();
    signal::cancel_on_signal(cancel.clone());

    let mut monitor = Monitor::from_config(&loaded.config);
    monitor.run(cancel).await;

    let stats = monitor.dispatcher().stats();
    info!(
        delivered = stats.delivered,
        failed = stats.failed,
        dropped = stats.dropped,
        abandoned = stats.abandoned,
        "TinyMonitor stopped"
    );
    Ok(ExitCode::SUCCESS)
}
