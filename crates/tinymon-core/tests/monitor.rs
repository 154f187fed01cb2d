mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use common::{providers, RecordingProvider, ScriptedCollector};
use tinymon_core::{CooldownPolicy, Dispatcher, DispatcherConfig, Monitor, MonitorSettings};
use tinymon_types::{AlertLevel, Severity};
use tokio_util::sync::CancellationToken;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

fn monitor(
    collector: &ScriptedCollector,
    provider: &Arc<RecordingProvider>,
    cooldown: CooldownPolicy,
    send_recovery: bool,
) -> Monitor {
    let dispatcher = Arc::new(Dispatcher::new(
        providers(&[provider]),
        DispatcherConfig::default(),
    ));
    Monitor::new(
        vec![Box::new(collector.clone())],
        dispatcher,
        MonitorSettings {
            refresh: Duration::from_millis(10),
            cooldown,
            send_recovery,
        },
    )
}

fn levels(provider: &RecordingProvider) -> Vec<AlertLevel> {
    provider.sent().iter().map(|a| a.level).collect()
}

#[tokio::test]
async fn test_incident_lifecycle() {
    let collector = ScriptedCollector::new(30);
    let provider = RecordingProvider::new("recorder").into_arc();
    let mut monitor = monitor(&collector, &provider, CooldownPolicy::Classic(0), true);

    collector.push("CPU", Some(Severity::Critical), "96.0%");
    monitor.run_checks_at(at(0));
    assert!(!monitor.tracker().state("CPU").unwrap().triggered);

    // 持续时间满足后才告警
    collector.push("CPU", Some(Severity::Critical), "97.0%");
    monitor.run_checks_at(at(40));
    assert!(monitor.tracker().state("CPU").unwrap().triggered);

    // 降级立即通知
    collector.push("CPU", Some(Severity::Warning), "85.0%");
    monitor.run_checks_at(at(41));

    collector.push("CPU", None, "20.0%");
    monitor.run_checks_at(at(42));
    assert!(monitor.tracker().state("CPU").is_none());

    monitor.dispatcher().shutdown().await;

    let sent = provider.sent();
    assert_eq!(
        levels(&provider),
        vec![AlertLevel::Critical, AlertLevel::Warning, AlertLevel::Recovered]
    );
    assert_eq!(sent[0].value, "97.0%");
    assert_eq!(sent[2].previous_level, Some(Severity::Warning));
    assert_eq!(sent[2].value, "20.0%");
}

#[tokio::test]
async fn test_short_spike_is_not_reported() {
    let collector = ScriptedCollector::new(30);
    let provider = RecordingProvider::new("recorder").into_arc();
    let mut monitor = monitor(&collector, &provider, CooldownPolicy::Classic(60), true);

    collector.push("LOAD", Some(Severity::Warning), "2.50");
    monitor.run_checks_at(at(0));
    collector.push("LOAD", None, "0.40");
    monitor.run_checks_at(at(10));

    monitor.dispatcher().shutdown().await;
    assert!(provider.sent().is_empty());
    assert!(monitor.tracker().is_empty());
}

#[tokio::test]
async fn test_classic_cooldown_cleared_by_recovery() {
    let collector = ScriptedCollector::new(0);
    let provider = RecordingProvider::new("recorder").into_arc();
    let mut monitor = monitor(&collector, &provider, CooldownPolicy::Classic(60), true);

    collector.push("MEMORY", Some(Severity::Critical), "95.0%");
    monitor.run_checks_at(at(0));
    collector.push("MEMORY", None, "50.0%");
    monitor.run_checks_at(at(5));
    // 恢复后新事件不受冷却限制
    collector.push("MEMORY", Some(Severity::Critical), "96.0%");
    monitor.run_checks_at(at(10));

    monitor.dispatcher().shutdown().await;
    assert_eq!(
        levels(&provider),
        vec![AlertLevel::Critical, AlertLevel::Recovered, AlertLevel::Critical]
    );
}

#[tokio::test]
async fn test_cooldown_kept_when_recovery_disabled() {
    let collector = ScriptedCollector::new(0);
    let provider = RecordingProvider::new("recorder").into_arc();
    let mut monitor = monitor(&collector, &provider, CooldownPolicy::Classic(60), false);

    collector.push("MEMORY", Some(Severity::Critical), "95.0%");
    monitor.run_checks_at(at(0));
    collector.push("MEMORY", None, "50.0%");
    monitor.run_checks_at(at(5));
    assert!(monitor.tracker().state("MEMORY").is_none());

    // 未发送恢复通知，冷却记录仍在
    collector.push("MEMORY", Some(Severity::Critical), "96.0%");
    monitor.run_checks_at(at(10));
    assert!(monitor.tracker().state("MEMORY").unwrap().triggered);

    collector.push("MEMORY", None, "50.0%");
    monitor.run_checks_at(at(20));
    collector.push("MEMORY", Some(Severity::Critical), "97.0%");
    monitor.run_checks_at(at(70));

    monitor.dispatcher().shutdown().await;
    assert_eq!(levels(&provider), vec![AlertLevel::Critical, AlertLevel::Critical]);
    assert_eq!(provider.sent()[1].value, "97.0%");
}

#[tokio::test]
async fn test_alert_once_notifies_once_per_incident() {
    let collector = ScriptedCollector::new(0);
    let provider = RecordingProvider::new("recorder").into_arc();
    let mut monitor = monitor(&collector, &provider, CooldownPolicy::AlertOnce, true);

    collector.push("DISK:/", Some(Severity::Warning), "85.0%");
    monitor.run_checks_at(at(0));
    for secs in [3600, 7200, 86_400] {
        collector.push("DISK:/", Some(Severity::Warning), "86.0%");
        monitor.run_checks_at(at(secs));
    }
    assert_eq!(monitor.gate().last_sent("DISK:/"), Some(at(0)));

    collector.push("DISK:/", None, "60.0%");
    monitor.run_checks_at(at(90_000));
    assert!(monitor.gate().last_sent("DISK:/").is_none());

    collector.push("DISK:/", Some(Severity::Warning), "88.0%");
    monitor.run_checks_at(at(90_010));

    monitor.dispatcher().shutdown().await;
    assert_eq!(
        levels(&provider),
        vec![AlertLevel::Warning, AlertLevel::Recovered, AlertLevel::Warning]
    );
}

#[tokio::test]
async fn test_alert_once_suppresses_second_raise_of_incident() {
    let collector = ScriptedCollector::new(0);
    let provider = RecordingProvider::new("recorder").into_arc();
    let mut monitor = monitor(&collector, &provider, CooldownPolicy::AlertOnce, true);

    collector.push("LOAD", Some(Severity::Warning), "2.90");
    monitor.run_checks_at(at(0));
    // 同一时刻升级，事件开始时间不晚于上次通知
    collector.push("LOAD", Some(Severity::Critical), "3.80");
    monitor.run_checks_at(at(0));
    assert_eq!(monitor.tracker().state("LOAD").unwrap().level, Severity::Critical);

    monitor.dispatcher().shutdown().await;
    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].level, AlertLevel::Warning);
}

#[tokio::test]
async fn test_components_are_tracked_independently() {
    let collector = ScriptedCollector::new(0);
    let provider = RecordingProvider::new("recorder").into_arc();
    let mut monitor = monitor(&collector, &provider, CooldownPolicy::Classic(60), true);

    collector.push("DISK:/", Some(Severity::Critical), "97.0%");
    monitor.run_checks_at(at(0));
    collector.push("DISK:/home", Some(Severity::Warning), "82.0%");
    monitor.run_checks_at(at(1));

    monitor.dispatcher().shutdown().await;
    let components: Vec<String> = provider.sent().into_iter().map(|a| a.component).collect();
    assert_eq!(components.len(), 2);
    assert!(components.contains(&"DISK:/".to_string()));
    assert!(components.contains(&"DISK:/home".to_string()));
    assert_eq!(monitor.tracker().len(), 2);
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let collector = ScriptedCollector::new(0);
    let provider = RecordingProvider::new("recorder").into_arc();
    let mut monitor = monitor(&collector, &provider, CooldownPolicy::Classic(60), true);
    collector.push("REBOOT", Some(Severity::Warning), "Reboot required");

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(async move {
        monitor.run(token).await;
        monitor
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    let monitor = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("monitor did not stop")
        .unwrap();

    assert!(collector.calls() >= 2);
    assert_eq!(levels(&provider), vec![AlertLevel::Warning]);

    // 分发器已关闭
    assert_eq!(
        monitor
            .dispatcher()
            .send_alert("REBOOT", Severity::Critical, "Reboot required"),
        0
    );
}
