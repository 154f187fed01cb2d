use std::path::Path;

use serde::{Deserialize, Serialize};
use tinymon_metrics::{FilesystemConfig, IoConfig, LoadConfig, MetricConfig, RebootConfig};
use tinymon_notify::AlertsConfig;

/// 告警冷却时间取此值时，每个事件只通知一次
pub const ALERT_ONCE: i64 = -1;

/// 完整的 agent 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 采集间隔（秒）
    pub refresh: i64,
    /// 同一组件两次告警的最小间隔（秒），`-1` 表示每个事件只告警一次
    pub cooldown: i64,
    /// 为空时只输出到 stdout
    pub log_file: String,
    pub load: LoadConfig,
    pub cpu: MetricConfig,
    pub memory: MetricConfig,
    pub filesystem: FilesystemConfig,
    pub reboot: RebootConfig,
    pub io: IoConfig,
    pub alerts: AlertsConfig,
    pub dispatch: DispatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh: 2,
            cooldown: 60,
            log_file: String::new(),
            load: LoadConfig::default(),
            cpu: MetricConfig::default(),
            memory: MetricConfig::default(),
            filesystem: FilesystemConfig::default(),
            reboot: RebootConfig::default(),
            io: IoConfig::default(),
            alerts: AlertsConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl Config {
    pub fn log_file(&self) -> Option<&Path> {
        let path = self.log_file.trim();
        (!path.is_empty()).then(|| Path::new(path))
    }

    pub fn is_alert_once(&self) -> bool {
        self.cooldown == ALERT_ONCE
    }
}

/// 通知分发器参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// 队列容量
    pub queue_size: usize,
    /// 工作任务数
    pub workers: usize,
    /// 关闭时等待队列清空的时间（秒）
    pub drain_timeout: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_size: 100,
            workers: 5,
            drain_timeout: 10,
        }
    }
}
