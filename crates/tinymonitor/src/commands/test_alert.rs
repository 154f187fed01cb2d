use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use tinymon_config::Config;
use tinymon_notify::context::hostname;
use tinymon_notify::PROVIDER_NAMES;
use tinymon_types::{Alert, Severity};

/// 直接向每个已启用的渠道发送一条测试告警，不经过过滤和队列
pub async fn execute(config_path: Option<&Path>, only: Option<&str>) -> ExitCode {
    let loaded = match Config::load(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let providers = loaded.config.alerts.build_providers(only);
    if providers.is_empty() {
        match only {
            Some(name) => {
                eprintln!("Provider '{name}' is not enabled or does not exist.");
                eprintln!("Available providers: {}", PROVIDER_NAMES.join(", "));
            }
            None => {
                eprintln!("No alert providers are enabled in your configuration.");
                eprintln!("Enable at least one provider in your config file.");
            }
        }
        return ExitCode::FAILURE;
    }

    let alert = test_alert(&hostname());

    println!("TinyMonitor Test Alert");
    println!("======================");
    println!();
    println!("Sending test alert to {} provider(s)...\n", providers.len());

    let (mut succeeded, mut failed) = (0, 0);
    for provider in &providers {
        print!("  {:<12} ", format!("{}:", provider.name()));
        let _ = std::io::stdout().flush();

        match provider.send(&alert).await {
            Ok(()) => {
                println!("OK");
                succeeded += 1;
            }
            Err(e) => {
                println!("FAILED - {e}");
                failed += 1;
            }
        }
    }

    println!();
    if failed == 0 {
        println!("All {succeeded} provider(s) successfully sent the test alert.");
        ExitCode::SUCCESS
    } else {
        println!("Results: {succeeded} succeeded, {failed} failed");
        ExitCode::FAILURE
    }
}

fn test_alert(host: &str) -> Alert {
    let mut alert = Alert::new("TEST", Severity::Warning, "This is a test alert");
    alert.title = format!("Test Alert from {host}");
    alert.message = format!(
        "This is a test alert from TinyMonitor on {host}. \
         If you receive this, your alert configuration is working correctly."
    );
    alert
}
