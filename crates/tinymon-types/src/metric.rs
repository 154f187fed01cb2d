use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// 采集器单次检查的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricResult {
    /// 组件标识，例如 `CPU`、`DISK:/home`
    pub component: String,
    /// `None` 表示正常
    pub level: Option<Severity>,
    /// 格式化后的读数
    pub value: String,
}

impl MetricResult {
    pub fn new(component: impl Into<String>, level: Option<Severity>, value: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            level,
            value: value.into(),
        }
    }
}

/// 单个组件当前的告警状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertState {
    pub level: Severity,
    pub start_time: DateTime<Utc>,
    /// 是否已经发出过告警
    pub triggered: bool,
}

impl AlertState {
    pub fn new(level: Severity, start_time: DateTime<Utc>) -> Self {
        Self {
            level,
            start_time,
            triggered: false,
        }
    }
}
