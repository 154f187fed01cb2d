use async_trait::async_trait;
use tinymon_types::{Alert, Severity};

use crate::error::NotifyError;

/// 通知渠道接口
#[async_trait]
pub trait Provider: Send + Sync {
    /// 渠道名称
    fn name(&self) -> &str;

    /// 发送通知
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError>;

    /// 该渠道是否接收此组件、此级别的告警
    fn should_send(&self, component: &str, level: Severity) -> bool;
}
