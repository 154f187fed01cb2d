use std::thread;

use sysinfo::System;
use tinymon_types::MetricResult;

use crate::collector::{classify, Collector};
use crate::config::LoadConfig;

/// 1 分钟平均负载采集器
pub struct LoadCollector {
    config: LoadConfig,
    cpu_count: usize,
}

impl LoadCollector {
    pub fn new(config: LoadConfig) -> Self {
        let cpu_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self { config, cpu_count }
    }

    pub fn thresholds(&self) -> (f64, f64) {
        self.config.thresholds(self.cpu_count)
    }
}

impl Collector for LoadCollector {
    fn name(&self) -> &str {
        "load"
    }

    fn check(&mut self) -> Vec<MetricResult> {
        // Windows 没有平均负载
        if cfg!(windows) {
            return Vec::new();
        }

        let load1 = System::load_average().one;
        let (warning, critical) = self.thresholds();
        let level = classify(load1, warning, critical);

        vec![MetricResult::new("LOAD", level, format!("{:.2}", load1))]
    }

    fn duration(&self) -> i64 {
        self.config.duration
    }
}
