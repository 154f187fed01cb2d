use std::path::PathBuf;

use tinymon_types::{MetricResult, Severity};

use crate::collector::Collector;
use crate::config::RebootConfig;

/// Debian/Ubuntu 安装更新后由 apt/dpkg 创建的标记文件
const REBOOT_FLAG_FILES: [&str; 2] = ["/var/run/reboot-required", "/run/reboot-required"];

/// 检查系统是否需要重启
pub struct RebootCollector {
    config: RebootConfig,
    flag_files: Vec<PathBuf>,
}

impl RebootCollector {
    pub fn new(config: RebootConfig) -> Self {
        Self::with_flag_files(config, REBOOT_FLAG_FILES.iter().map(PathBuf::from).collect())
    }

    pub fn with_flag_files(config: RebootConfig, flag_files: Vec<PathBuf>) -> Self {
        Self { config, flag_files }
    }
}

impl Collector for RebootCollector {
    fn name(&self) -> &str {
        "reboot"
    }

    fn check(&mut self) -> Vec<MetricResult> {
        let required = self.flag_files.iter().any(|path| path.exists());

        let result = if required {
            MetricResult::new(
                "REBOOT",
                Some(Severity::Warning),
                "System requires a reboot (updates installed)",
            )
        } else {
            MetricResult::new("REBOOT", None, "OK")
        };

        vec![result]
    }

    fn duration(&self) -> i64 {
        self.config.duration
    }
}
