use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tinymon_metrics::Collector;
use tinymon_types::{MetricResult, Severity};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cooldown::{CooldownGate, CooldownPolicy};
use crate::dispatcher::Dispatcher;
use crate::tracker::{Decision, StateTracker};

/// 监控循环参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub refresh: Duration,
    pub cooldown: CooldownPolicy,
    pub send_recovery: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            refresh: Duration::from_secs(2),
            cooldown: CooldownPolicy::Classic(60),
            send_recovery: true,
        }
    }
}

/// 主监控循环：采集、状态判定、冷却、分发
pub struct Monitor {
    collectors: Vec<Box<dyn Collector>>,
    tracker: StateTracker,
    gate: CooldownGate,
    dispatcher: Arc<Dispatcher>,
    settings: MonitorSettings,
}

impl Monitor {
    pub fn new(
        collectors: Vec<Box<dyn Collector>>,
        dispatcher: Arc<Dispatcher>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            collectors,
            tracker: StateTracker::new(),
            gate: CooldownGate::new(settings.cooldown),
            dispatcher,
            settings,
        }
    }

    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn collector_names(&self) -> Vec<&str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// 按刷新间隔运行，直到 `cancel` 被触发，然后关闭分发器
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!(
            collectors = ?self.collector_names(),
            providers = self.dispatcher.providers().len(),
            refresh = ?self.settings.refresh,
            "Starting TinyMonitor"
        );

        // 第一次 tick 立即触发
        let mut ticker = tokio::time::interval(self.settings.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.run_checks(),
            }
        }

        info!("Stopping TinyMonitor...");
        self.dispatcher.shutdown().await;
    }

    /// 执行一轮检查
    pub fn run_checks(&mut self) {
        self.run_checks_at(Utc::now());
    }

    pub fn run_checks_at(&mut self, now: DateTime<Utc>) {
        let mut observations = Vec::new();
        for collector in &mut self.collectors {
            let duration = collector.duration();
            let results = collector.check();
            if results.is_empty() {
                debug!(collector = collector.name(), "No results this cycle");
            }
            observations.extend(results.into_iter().map(|result| (result, duration)));
        }

        for (result, duration) in observations {
            self.observe(result, duration, now);
        }
    }

    fn observe(&mut self, result: MetricResult, duration: i64, now: DateTime<Utc>) {
        let MetricResult {
            component,
            level,
            value,
        } = result;

        match self.tracker.process_at(&component, level, duration, now) {
            Decision::None => {
                let waiting = self
                    .tracker
                    .state(&component)
                    .is_some_and(|state| !state.triggered && state.start_time == now);
                if waiting {
                    debug!(component = %component, level = ?level, duration, "Detected alert, waiting for duration");
                }
            }
            Decision::Raise(level) => self.trigger_alert(&component, level, &value, now),
            Decision::Recover(previous) => self.trigger_recovery(&component, previous, &value),
        }
    }

    fn trigger_alert(&mut self, component: &str, level: Severity, value: &str, now: DateTime<Utc>) {
        let incident_start = self.tracker.state(component).map(|state| state.start_time);

        if !self.gate.allow_at(component, incident_start, now) {
            match self.gate.policy() {
                CooldownPolicy::Classic(_) => debug!(component, "Alert suppressed (cooldown)"),
                CooldownPolicy::AlertOnce => debug!(component, "Alert suppressed (already sent)"),
            }
            return;
        }

        info!(component, level = %level, value, "ALERT");
        self.dispatcher.send_alert(component, level, value);
    }

    fn trigger_recovery(&mut self, component: &str, previous: Severity, value: &str) {
        if !self.settings.send_recovery {
            debug!(component, "Recovery notification disabled");
            return;
        }

        info!(component, previous_level = %previous, value, "RECOVERY");
        self.dispatcher.send_recovery(component, previous, value);
        self.gate.clear(component);
    }
}
