#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tinymon_metrics::Collector;
use tinymon_notify::{AlertFilter, FilterMode, NotifyError, Provider};
use tinymon_types::{Alert, MetricResult, Severity};
use tokio::sync::{Notify, Semaphore};

/// 记录收到的通知，可配置延迟、失败和阻塞
pub struct RecordingProvider {
    name: String,
    filter: AlertFilter,
    sent: Mutex<Vec<Alert>>,
    delay: Duration,
    fail: bool,
    permits: Option<Semaphore>,
    pub started: Notify,
}

impl RecordingProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            filter: AlertFilter::new(true, FilterMode::NoFilter),
            sent: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            fail: false,
            permits: None,
            started: Notify::new(),
        }
    }

    pub fn with_filter(mut self, filter: AlertFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_levels(self, levels: &[&str]) -> Self {
        let levels: Vec<String> = levels.iter().map(|s| s.to_string()).collect();
        self.with_filter(AlertFilter::from_config(true, &levels, &HashMap::new()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// 每次发送都要等待 `release` 放行
    pub fn blocked(mut self) -> Self {
        self.permits = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self, n: usize) {
        if let Some(permits) = &self.permits {
            permits.add_permits(n);
        }
    }

    pub fn sent(&self) -> Vec<Alert> {
        self.sent.lock().unwrap().clone()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        self.started.notify_one();

        if let Some(permits) = &self.permits {
            permits.acquire().await.unwrap().forget();
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(NotifyError::Status(503));
        }

        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }

    fn should_send(&self, component: &str, level: Severity) -> bool {
        self.filter.allows(component, level)
    }
}

/// 按脚本逐轮返回结果的采集器
#[derive(Clone)]
pub struct ScriptedCollector {
    duration: i64,
    script: Arc<Mutex<VecDeque<Vec<MetricResult>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedCollector {
    pub fn new(duration: i64) -> Self {
        Self {
            duration,
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 追加一轮结果
    pub fn push(&self, component: &str, level: Option<Severity>, value: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(vec![MetricResult::new(component, level, value)]);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Collector for ScriptedCollector {
    fn name(&self) -> &str {
        "scripted"
    }

    fn check(&mut self) -> Vec<MetricResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().unwrap().pop_front().unwrap_or_default()
    }

    fn duration(&self) -> i64 {
        self.duration
    }
}

pub fn providers(list: &[&Arc<RecordingProvider>]) -> Vec<Arc<dyn Provider>> {
    list.iter()
        .map(|p| Arc::clone(*p) as Arc<dyn Provider>)
        .collect()
}
