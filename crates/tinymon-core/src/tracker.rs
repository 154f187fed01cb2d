use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tinymon_types::{AlertState, Severity};

/// 一次观测之后需要执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 无需通知
    None,
    /// 发出告警
    Raise(Severity),
    /// 发出恢复通知，携带恢复前的级别
    Recover(Severity),
}

/// 每个组件的告警状态机（带持续时间去抖）
///
/// 只由监控循环持有和修改，不加锁。
#[derive(Debug, Default)]
pub struct StateTracker {
    states: HashMap<String, AlertState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, component: &str, observed: Option<Severity>, min_duration: i64) -> Decision {
        self.process_at(component, observed, min_duration, Utc::now())
    }

    /// 以指定时间处理一次观测
    pub fn process_at(
        &mut self,
        component: &str,
        observed: Option<Severity>,
        min_duration: i64,
        now: DateTime<Utc>,
    ) -> Decision {
        let Some(level) = observed else {
            // 回到正常：只有已经告警过的状态才需要恢复通知
            return match self.states.remove(component) {
                Some(state) if state.triggered => Decision::Recover(state.level),
                _ => Decision::None,
            };
        };

        match self.states.get_mut(component) {
            Some(state) if state.level == level => {
                if state.triggered {
                    return Decision::None;
                }
                // 超出可表示范围的持续时间视为永不满足
                let required = Duration::try_seconds(min_duration).unwrap_or(Duration::MAX);
                if now - state.start_time >= required {
                    state.triggered = true;
                    return Decision::Raise(level);
                }
                Decision::None
            }
            previous => {
                // 已告警状态降级时立即通知，升级则重新计时
                let de_escalated = previous
                    .as_deref()
                    .is_some_and(|prev| prev.triggered && level.is_lower_than(prev.level));

                let mut state = AlertState::new(level, now);
                let decision = if de_escalated || min_duration <= 0 {
                    state.triggered = true;
                    Decision::Raise(level)
                } else {
                    Decision::None
                };

                self.states.insert(component.to_string(), state);
                decision
            }
        }
    }

    pub fn state(&self, component: &str) -> Option<&AlertState> {
        self.states.get(component)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    #[test]
    fn test_nominal_without_state() {
        let mut tracker = StateTracker::new();
        assert_eq!(tracker.process_at("CPU", None, 30, t0()), Decision::None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_debounce_then_raise() {
        let mut tracker = StateTracker::new();

        assert_eq!(tracker.process_at("CPU", Some(Severity::Critical), 30, t0()), Decision::None);
        assert_eq!(tracker.process_at("CPU", Some(Severity::Critical), 30, at(29)), Decision::None);
        assert!(!tracker.state("CPU").unwrap().triggered);

        assert_eq!(
            tracker.process_at("CPU", Some(Severity::Critical), 30, at(40)),
            Decision::Raise(Severity::Critical)
        );
        assert!(tracker.state("CPU").unwrap().triggered);

        // 已告警后保持同级不再通知
        assert_eq!(tracker.process_at("CPU", Some(Severity::Critical), 30, at(80)), Decision::None);
    }

    #[test]
    fn test_raise_exactly_at_duration() {
        let mut tracker = StateTracker::new();
        tracker.process_at("LOAD", Some(Severity::Warning), 30, t0());
        assert_eq!(
            tracker.process_at("LOAD", Some(Severity::Warning), 30, at(30)),
            Decision::Raise(Severity::Warning)
        );
    }

    #[test]
    fn test_zero_duration_raises_immediately() {
        let mut tracker = StateTracker::new();
        assert_eq!(
            tracker.process_at("REBOOT", Some(Severity::Warning), 0, t0()),
            Decision::Raise(Severity::Warning)
        );
        assert_eq!(
            tracker.process_at("REBOOT", Some(Severity::Warning), -5, at(1)),
            Decision::None
        );
    }

    #[test]
    fn test_de_escalation_raises_immediately() {
        let mut tracker = StateTracker::new();
        tracker.process_at("CPU", Some(Severity::Critical), 30, t0());
        tracker.process_at("CPU", Some(Severity::Critical), 30, at(40));

        assert_eq!(
            tracker.process_at("CPU", Some(Severity::Warning), 30, at(41)),
            Decision::Raise(Severity::Warning)
        );
        let state = tracker.state("CPU").unwrap();
        assert_eq!(state.level, Severity::Warning);
        assert!(state.triggered);
        assert_eq!(state.start_time, at(41));

        assert_eq!(
            tracker.process_at("CPU", None, 30, at(42)),
            Decision::Recover(Severity::Warning)
        );
        assert!(tracker.state("CPU").is_none());
    }

    #[test]
    fn test_escalation_restarts_wait() {
        let mut tracker = StateTracker::new();
        tracker.process_at("MEMORY", Some(Severity::Warning), 30, t0());
        tracker.process_at("MEMORY", Some(Severity::Warning), 30, at(30));
        assert!(tracker.state("MEMORY").unwrap().triggered);

        assert_eq!(
            tracker.process_at("MEMORY", Some(Severity::Critical), 30, at(31)),
            Decision::None
        );
        assert!(!tracker.state("MEMORY").unwrap().triggered);

        assert_eq!(
            tracker.process_at("MEMORY", Some(Severity::Critical), 30, at(61)),
            Decision::Raise(Severity::Critical)
        );
    }

    #[test]
    fn test_de_escalation_before_trigger_waits() {
        let mut tracker = StateTracker::new();
        tracker.process_at("CPU", Some(Severity::Critical), 30, t0());

        assert_eq!(tracker.process_at("CPU", Some(Severity::Warning), 30, at(10)), Decision::None);
        assert_eq!(tracker.state("CPU").unwrap().start_time, at(10));
    }

    #[test]
    fn test_silent_recovery_when_never_triggered() {
        let mut tracker = StateTracker::new();
        assert_eq!(tracker.process_at("MEMORY", Some(Severity::Critical), 30, t0()), Decision::None);
        assert_eq!(tracker.process_at("MEMORY", None, 30, at(5)), Decision::None);
        assert!(tracker.state("MEMORY").is_none());
    }

    #[test]
    fn test_oversized_duration_keeps_waiting() {
        let mut tracker = StateTracker::new();
        let duration = i64::MAX / 100;

        assert_eq!(tracker.process_at("CPU", Some(Severity::Critical), duration, t0()), Decision::None);
        assert_eq!(
            tracker.process_at("CPU", Some(Severity::Critical), duration, at(86_400 * 365)),
            Decision::None
        );
        assert!(!tracker.state("CPU").unwrap().triggered);
    }

    #[test]
    fn test_components_are_independent() {
        let mut tracker = StateTracker::new();
        tracker.process_at("DISK:/", Some(Severity::Warning), 0, t0());
        tracker.process_at("DISK:/home", Some(Severity::Critical), 60, t0());

        assert_eq!(tracker.len(), 2);
        assert!(tracker.state("DISK:/").unwrap().triggered);
        assert!(!tracker.state("DISK:/home").unwrap().triggered);
    }
}
