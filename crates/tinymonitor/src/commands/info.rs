use std::fmt::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use tinymon_config::Config;
use tinymon_metrics::IoThreshold;

const ENABLED: &str = "[✓]";
const DISABLED: &str = "[✗]";

/// 打印配置摘要：全局参数、指标阈值和通知渠道
pub fn execute(config_path: Option<&Path>) -> anyhow::Result<ExitCode> {
    let loaded = match Config::load(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
    let summary = render(&loaded.config, loaded.source.as_deref(), cpus)
        .context("failed to render configuration summary")?;
    print!("{summary}");
    Ok(ExitCode::SUCCESS)
}

fn render(config: &Config, source: Option<&Path>, cpus: usize) -> Result<String, fmt::Error> {
    let mut out = String::new();

    match source {
        Some(path) => writeln!(out, "Configuration: {}", path.display())?,
        None => writeln!(out, "Configuration: (using defaults)")?,
    }
    writeln!(out)?;
    global_settings(&mut out, config)?;
    writeln!(out)?;
    metrics(&mut out, config, cpus)?;
    writeln!(out)?;
    providers(&mut out, config)?;

    Ok(out)
}

fn global_settings(out: &mut String, config: &Config) -> fmt::Result {
    writeln!(out, "Global Settings")?;
    writeln!(out, "  Refresh:   {}s", config.refresh)?;

    if config.is_alert_once() {
        writeln!(out, "  Cooldown:  once per incident")?;
    } else {
        writeln!(out, "  Cooldown:  {}s", config.cooldown)?;
    }

    match config.log_file() {
        Some(path) => writeln!(out, "  Log File:  {}", path.display())?,
        None => writeln!(out, "  Log File:  (stdout)")?,
    }
    writeln!(
        out,
        "  Dispatch:  {} worker(s), queue {}",
        config.dispatch.workers, config.dispatch.queue_size
    )
}

fn metrics(out: &mut String, config: &Config, cpus: usize) -> fmt::Result {
    writeln!(out, "Metrics")?;

    let percent = |out: &mut String, name: &str, enabled: bool, warning: f64, critical: f64, duration: i64, extra: String| {
        if enabled {
            writeln!(
                out,
                "  {ENABLED} {name:<11} warning: {warning:.0}%    critical: {critical:.0}%{}{extra}",
                format_duration(duration)
            )
        } else {
            writeln!(out, "  {DISABLED} {name:<11} (disabled)")
        }
    };

    let cpu = &config.cpu;
    percent(out, "CPU", cpu.enabled, cpu.warning, cpu.critical, cpu.duration, String::new())?;
    let memory = &config.memory;
    percent(out, "Memory", memory.enabled, memory.warning, memory.critical, memory.duration, String::new())?;

    let fs = &config.filesystem;
    let exclude = if fs.exclude.is_empty() {
        String::new()
    } else {
        format!("    exclude: {} paths", fs.exclude.len())
    };
    percent(out, "Filesystem", fs.enabled, fs.warning, fs.critical, fs.duration, exclude)?;

    let load = &config.load;
    if load.enabled {
        let (warning, critical) = load.thresholds(cpus);
        let mode = if load.auto {
            format!("    auto: {cpus} CPU(s)")
        } else {
            String::new()
        };
        writeln!(
            out,
            "  {ENABLED} {:<11} warning: {warning:.1}     critical: {critical:.1}{}{mode}",
            "Load",
            format_duration(load.duration)
        )?;
    } else {
        writeln!(out, "  {DISABLED} {:<11} (disabled)", "Load")?;
    }

    let io = &config.io;
    if io.enabled {
        writeln!(
            out,
            "  {ENABLED} {:<11} warning: {}   critical: {}{}",
            "I/O",
            format_io(io.warning.as_ref()),
            format_io(io.critical.as_ref()),
            format_duration(io.duration)
        )?;
    } else {
        writeln!(out, "  {DISABLED} {:<11} (disabled)", "I/O")?;
    }

    if config.reboot.enabled {
        writeln!(out, "  {ENABLED} {:<11} (checks /var/run/reboot-required)", "Reboot")
    } else {
        writeln!(out, "  {DISABLED} {:<11} (disabled)", "Reboot")
    }
}

fn providers(out: &mut String, config: &Config) -> fmt::Result {
    let alerts = &config.alerts;
    writeln!(out, "Alert Providers")?;

    let line = |out: &mut String, name: &str, enabled: bool, detail: String| {
        if enabled {
            writeln!(out, "  {ENABLED} {name:<11} {detail}")
        } else {
            writeln!(out, "  {DISABLED} {name}")
        }
    };

    line(out, "Ntfy", alerts.ntfy.enabled, alerts.ntfy.topic_url.clone())?;
    line(
        out,
        "Google Chat",
        alerts.google_chat.enabled,
        truncate_url(&alerts.google_chat.webhook_url),
    )?;
    line(
        out,
        "SMTP",
        alerts.smtp.enabled,
        format!(
            "{}:{} → {} recipient(s)",
            alerts.smtp.host,
            alerts.smtp.port,
            alerts.smtp.to_addrs.len()
        ),
    )?;
    line(out, "Webhook", alerts.webhook.enabled, truncate_url(&alerts.webhook.url))?;
    line(out, "Gotify", alerts.gotify.enabled, alerts.gotify.url.clone())?;

    if !alerts.send_recovery {
        writeln!(out, "  (recovery notifications disabled)")?;
    }
    Ok(())
}

fn format_duration(secs: i64) -> String {
    if secs > 0 {
        format!("    duration: {secs}s")
    } else {
        String::new()
    }
}

fn format_io(threshold: Option<&IoThreshold>) -> String {
    match threshold {
        None => "N/A".to_string(),
        Some(IoThreshold::Number(n)) => format!("{n:.0}"),
        Some(IoThreshold::Text(s)) => s.clone(),
    }
}

fn truncate_url(url: &str) -> String {
    if url.chars().count() > 50 {
        let head: String = url.chars().take(47).collect();
        format!("{head}...")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_defaults() {
        let out = render(&Config::default(), None, 4).unwrap();

        assert!(out.starts_with("Configuration: (using defaults)\n"));
        assert!(out.contains("  Refresh:   2s\n"));
        assert!(out.contains("  Cooldown:  60s\n"));
        assert!(out.contains("  Log File:  (stdout)\n"));
        assert!(out.contains("  [✓] CPU         warning: 70%    critical: 90%    duration: 120s\n"));
        assert!(out.contains("  [✓] Load        warning: 2.8     critical: 3.6    duration: 180s    auto: 4 CPU(s)\n"));
        assert!(out.contains("  [✓] I/O         warning: N/A   critical: N/A    duration: 120s\n"));
        assert!(out.contains("  [✓] Reboot      (checks /var/run/reboot-required)\n"));
        assert!(out.contains("  [✗] Ntfy\n"));
        assert!(out.contains("  [✗] Gotify\n"));
    }

    #[test]
    fn test_render_configured() {
        let mut config = Config {
            cooldown: -1,
            log_file: "/var/log/tinymonitor.log".to_string(),
            ..Config::default()
        };
        config.cpu.enabled = false;
        config.filesystem.exclude = vec!["/snap".to_string(), "/boot".to_string()];
        config.io.warning = Some(IoThreshold::Text("50M".to_string()));
        config.io.critical = Some(IoThreshold::Number(209715200.0));
        config.alerts.smtp.enabled = true;
        config.alerts.smtp.host = "mail.example.com".to_string();
        config.alerts.smtp.to_addrs = vec!["a@example.com".to_string(), "b@example.com".to_string()];

        let source = PathBuf::from("/etc/tinymonitor/config.toml");
        let out = render(&config, Some(&source), 2).unwrap();

        assert!(out.starts_with("Configuration: /etc/tinymonitor/config.toml\n"));
        assert!(out.contains("  Cooldown:  once per incident\n"));
        assert!(out.contains("  Log File:  /var/log/tinymonitor.log\n"));
        assert!(out.contains("  [✗] CPU         (disabled)\n"));
        assert!(out.contains("    exclude: 2 paths\n"));
        assert!(out.contains("warning: 50M   critical: 209715200"));
        assert!(out.contains("  [✓] SMTP        mail.example.com:587 → 2 recipient(s)\n"));
    }

    #[test]
    fn test_truncate_url() {
        assert_eq!(truncate_url("https://example.com/hook"), "https://example.com/hook");

        let long = format!("https://chat.googleapis.com/v1/spaces/{}", "x".repeat(40));
        let truncated = truncate_url(&long);
        assert_eq!(truncated.chars().count(), 50);
        assert!(truncated.ends_with("..."));
    }
}
