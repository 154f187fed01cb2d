use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::{AlertLevel, Severity};

/// 发往通知渠道的告警
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub component: String,
    pub level: AlertLevel,
    pub value: String,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// 仅恢复通知携带：恢复前的级别
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_level: Option<Severity>,
}

impl Alert {
    /// 创建告警通知
    pub fn new(component: impl Into<String>, level: Severity, value: impl Into<String>) -> Self {
        let component = component.into();
        let value = value.into();
        Self {
            title: format!("ALERT {} : {}", level, component),
            message: format!(
                "Component {} is in state {}. Value: {}",
                component, level, value
            ),
            component,
            level: level.into(),
            value,
            timestamp: Utc::now(),
            previous_level: None,
        }
    }

    /// 创建恢复通知
    pub fn recovery(
        component: impl Into<String>,
        previous_level: Severity,
        value: impl Into<String>,
    ) -> Self {
        let component = component.into();
        let value = value.into();
        Self {
            title: format!("RECOVERED : {}", component),
            message: format!(
                "Component {} is back to normal. Previous state: {}. Current value: {}",
                component, previous_level, value
            ),
            component,
            level: AlertLevel::Recovered,
            value,
            timestamp: Utc::now(),
            previous_level: Some(previous_level),
        }
    }

    pub fn is_recovery(&self) -> bool {
        self.level.is_recovery()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_text() {
        let alert = Alert::new("CPU", Severity::Critical, "95.0%");

        assert_eq!(alert.title, "ALERT CRITICAL : CPU");
        assert_eq!(alert.message, "Component CPU is in state CRITICAL. Value: 95.0%");
        assert_eq!(alert.level, AlertLevel::Critical);
        assert!(alert.previous_level.is_none());
        assert!(!alert.is_recovery());
    }

    #[test]
    fn test_recovery_text() {
        let alert = Alert::recovery("DISK:/", Severity::Warning, "42.0%");

        assert_eq!(alert.title, "RECOVERED : DISK:/");
        assert_eq!(
            alert.message,
            "Component DISK:/ is back to normal. Previous state: WARNING. Current value: 42.0%"
        );
        assert_eq!(alert.previous_level, Some(Severity::Warning));
        assert!(alert.is_recovery());
    }
}
