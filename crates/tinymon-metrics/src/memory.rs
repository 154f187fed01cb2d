use sysinfo::System;
use tinymon_types::MetricResult;
use tracing::debug;

use crate::collector::{classify, Collector};
use crate::config::MetricConfig;

/// 内存使用率采集器
pub struct MemoryCollector {
    config: MetricConfig,
    system: System,
}

impl MemoryCollector {
    pub fn new(config: MetricConfig) -> Self {
        Self {
            config,
            system: System::new(),
        }
    }
}

/// 已用内存百分比
pub(crate) fn used_percent(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(used as f64 / total as f64 * 100.0)
}

impl Collector for MemoryCollector {
    fn name(&self) -> &str {
        "memory"
    }

    fn check(&mut self) -> Vec<MetricResult> {
        self.system.refresh_memory();

        let Some(percent) = used_percent(self.system.used_memory(), self.system.total_memory())
        else {
            debug!("Total memory reported as zero, skipping memory check");
            return Vec::new();
        };

        let level = classify(percent, self.config.warning, self.config.critical);
        vec![MetricResult::new("MEMORY", level, format!("{:.1}%", percent))]
    }

    fn duration(&self) -> i64 {
        self.config.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_percent() {
        assert_eq!(used_percent(50, 200), Some(25.0));
        assert_eq!(used_percent(0, 0), None);
    }

    #[test]
    fn test_memory_collector_reports_one_result() {
        let mut collector = MemoryCollector::new(MetricConfig::default());
        let results = collector.check();

        // 部分沙箱环境读不到内存信息，此时返回空列表
        assert!(results.len() <= 1);
        if let Some(result) = results.first() {
            assert_eq!(result.component, "MEMORY");
            assert!(result.value.ends_with('%'));
        }
        assert_eq!(collector.duration(), 120);
    }
}
