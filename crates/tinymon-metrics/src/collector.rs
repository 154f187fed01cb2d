use tinymon_types::{MetricResult, Severity};

/// 指标采集器接口
///
/// `check` 返回空列表表示本轮没有数据（采集失败或尚未就绪），
/// 调用方不会因此改变任何告警状态。
pub trait Collector: Send {
    /// 采集器名称
    fn name(&self) -> &str;

    /// 执行一次检查
    fn check(&mut self) -> Vec<MetricResult>;

    /// 告警前需要持续的时间（秒）
    fn duration(&self) -> i64;
}

/// 按阈值判定级别，读数达到阈值即触发
pub fn classify(value: f64, warning: f64, critical: f64) -> Option<Severity> {
    if value >= critical {
        Some(Severity::Critical)
    } else if value >= warning {
        Some(Severity::Warning)
    } else {
        None
    }
}
