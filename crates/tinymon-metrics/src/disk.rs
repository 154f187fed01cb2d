use sysinfo::Disks;
use tinymon_types::MetricResult;
use tracing::debug;

use crate::collector::{classify, Collector};
use crate::config::FilesystemConfig;

/// 文件系统使用率采集器，每个挂载点一个组件 `DISK:<mount>`
pub struct DiskCollector {
    config: FilesystemConfig,
    disks: Disks,
}

impl DiskCollector {
    pub fn new(config: FilesystemConfig) -> Self {
        Self {
            config,
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

/// 是否跳过该挂载点：loop/squashfs、docker/overlay、光驱、空文件系统以及用户排除项
pub(crate) fn should_skip(device: &str, file_system: &str, mount_point: &str, exclude: &[String]) -> bool {
    if device.contains("loop") || file_system == "squashfs" {
        return true;
    }
    if mount_point.contains("docker") || file_system == "overlay" {
        return true;
    }
    if file_system.is_empty() || file_system == "iso9660" || file_system == "udf" {
        return true;
    }
    exclude.iter().any(|ex| mount_point.contains(ex.as_str()))
}

fn usage_percent(total: u64, available: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(total.saturating_sub(available) as f64 / total as f64 * 100.0)
}

impl Collector for DiskCollector {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn check(&mut self) -> Vec<MetricResult> {
        self.disks.refresh_list();

        let mut results = Vec::new();
        for disk in self.disks.list() {
            let device = disk.name().to_string_lossy();
            let file_system = disk.file_system().to_string_lossy();
            let mount_point = disk.mount_point().to_string_lossy();

            if should_skip(&device, &file_system, &mount_point, &self.config.exclude) {
                continue;
            }

            let Some(percent) = usage_percent(disk.total_space(), disk.available_space()) else {
                debug!(mount_point = %mount_point, "Skipping filesystem with zero size");
                continue;
            };

            let level = classify(percent, self.config.warning, self.config.critical);
            results.push(MetricResult::new(
                format!("DISK:{}", mount_point),
                level,
                format!("{:.1}%", percent),
            ));
        }

        results
    }

    fn duration(&self) -> i64 {
        self.config.duration
    }
}
