use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// 重复告警的抑制策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownPolicy {
    /// 同一组件两次告警至少间隔指定秒数
    Classic(i64),
    /// 每个事件只通知一次
    AlertOnce,
}

impl CooldownPolicy {
    /// 从配置值解析：`-1` 为每事件一次，其余为秒数
    pub fn from_secs(cooldown: i64) -> Self {
        if cooldown == -1 {
            CooldownPolicy::AlertOnce
        } else {
            CooldownPolicy::Classic(cooldown.max(0))
        }
    }
}

/// 按组件记录上次通知时间
#[derive(Debug)]
pub struct CooldownGate {
    policy: CooldownPolicy,
    last_sent: HashMap<String, DateTime<Utc>>,
}

impl CooldownGate {
    pub fn new(policy: CooldownPolicy) -> Self {
        Self {
            policy,
            last_sent: HashMap::new(),
        }
    }

    pub fn policy(&self) -> CooldownPolicy {
        self.policy
    }

    pub fn allow(&mut self, component: &str, incident_start: Option<DateTime<Utc>>) -> bool {
        self.allow_at(component, incident_start, Utc::now())
    }

    /// 允许时记录 `now` 作为该组件的上次通知时间
    pub fn allow_at(
        &mut self,
        component: &str,
        incident_start: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        let last = self.last_sent.get(component).copied();

        let allowed = match self.policy {
            CooldownPolicy::Classic(secs) => {
                let cooldown = Duration::try_seconds(secs).unwrap_or(Duration::MAX);
                last.map_or(true, |last| now - last > cooldown)
            }
            CooldownPolicy::AlertOnce => match incident_start {
                // 没有进行中的事件就没有可以通知的内容
                None => false,
                Some(start) => last.map_or(true, |last| last < start),
            },
        };

        if allowed {
            self.last_sent.insert(component.to_string(), now);
        }
        allowed
    }

    /// 恢复后清除记录，下一次事件不受上次冷却影响
    pub fn clear(&mut self, component: &str) {
        self.last_sent.remove(component);
    }

    pub fn last_sent(&self, component: &str) -> Option<DateTime<Utc>> {
        self.last_sent.get(component).copied()
    }
}
