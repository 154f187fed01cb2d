use serde::{Deserialize, Serialize};

/// 百分比类指标配置（CPU、内存）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    pub enabled: bool,
    pub warning: f64,
    pub critical: f64,
    /// 持续时间（秒）
    pub duration: i64,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warning: 70.0,
            critical: 90.0,
            duration: 120,
        }
    }
}

/// 负载配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub enabled: bool,
    /// 按 CPU 数量自动计算阈值
    pub auto: bool,
    pub warning_ratio: f64,
    pub critical_ratio: f64,
    pub warning: f64,
    pub critical: f64,
    pub duration: i64,
}

impl LoadConfig {
    /// 实际生效的 (warning, critical) 阈值
    pub fn thresholds(&self, cpu_count: usize) -> (f64, f64) {
        if self.auto {
            let cpus = cpu_count as f64;
            (cpus * self.warning_ratio, cpus * self.critical_ratio)
        } else {
            (self.warning, self.critical)
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto: true,
            warning_ratio: 0.7,
            critical_ratio: 0.9,
            warning: 0.0,
            critical: 0.0,
            duration: 180,
        }
    }
}

/// 文件系统配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemConfig {
    pub enabled: bool,
    pub warning: f64,
    pub critical: f64,
    pub duration: i64,
    /// 挂载点包含其中任意子串即忽略
    pub exclude: Vec<String>,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warning: 80.0,
            critical: 90.0,
            duration: 300,
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebootConfig {
    pub enabled: bool,
    pub duration: i64,
}

impl Default for RebootConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 0,
        }
    }
}

/// I/O 阈值：数字（字节/秒）、带单位的字符串（`50M`、`1.5GB`）或百分比（`80%`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IoThreshold {
    Number(f64),
    Text(String),
}

/// 磁盘 I/O 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub enabled: bool,
    pub warning: Option<IoThreshold>,
    pub critical: Option<IoThreshold>,
    /// 百分比阈值的基准值
    pub max_speed: Option<IoThreshold>,
    pub duration: i64,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warning: None,
            critical: None,
            max_speed: None,
            duration: 120,
        }
    }
}
