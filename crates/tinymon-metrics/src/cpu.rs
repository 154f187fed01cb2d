use sysinfo::System;
use tinymon_types::MetricResult;
use tracing::debug;

use crate::collector::{classify, Collector};
use crate::config::MetricConfig;

/// CPU 使用率采集器
pub struct CpuCollector {
    config: MetricConfig,
    system: System,
}

impl CpuCollector {
    pub fn new(config: MetricConfig) -> Self {
        let mut system = System::new();
        // 第一次刷新只建立基线，使用率从下一次开始有效
        system.refresh_cpu();
        Self { config, system }
    }
}

impl Collector for CpuCollector {
    fn name(&self) -> &str {
        "cpu"
    }

    fn check(&mut self) -> Vec<MetricResult> {
        self.system.refresh_cpu();

        if self.system.cpus().is_empty() {
            debug!("No CPU information available");
            return Vec::new();
        }

        let usage = f64::from(self.system.global_cpu_info().cpu_usage());
        let level = classify(usage, self.config.warning, self.config.critical);

        vec![MetricResult::new("CPU", level, format!("{:.1}%", usage))]
    }

    fn duration(&self) -> i64 {
        self.config.duration
    }
}
