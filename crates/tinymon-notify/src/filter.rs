use std::collections::{HashMap, HashSet};

use tinymon_types::Severity;

/// 规则表中的兜底键
pub const DEFAULT_RULE_KEY: &str = "default";

/// 过滤模式，在渠道创建时一次性解析
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterMode {
    /// 接收所有非正常级别
    NoFilter,
    /// 旧式级别列表
    Levels(HashSet<Severity>),
    /// 组件（已归一化）到级别集合的规则表
    Rules(HashMap<String, HashSet<Severity>>),
}

/// 渠道级告警过滤器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertFilter {
    enabled: bool,
    mode: FilterMode,
}

impl AlertFilter {
    pub fn new(enabled: bool, mode: FilterMode) -> Self {
        Self { enabled, mode }
    }

    /// 从配置解析：规则表优先，其次级别列表，都没有时不过滤。
    /// 无法识别的级别名称被忽略。
    pub fn from_config(enabled: bool, levels: &[String], rules: &HashMap<String, Vec<String>>) -> Self {
        let mode = if !rules.is_empty() {
            FilterMode::Rules(
                rules
                    .iter()
                    .map(|(key, levels)| (key.to_lowercase(), parse_levels(levels)))
                    .collect(),
            )
        } else if !levels.is_empty() {
            FilterMode::Levels(parse_levels(levels))
        } else {
            FilterMode::NoFilter
        };

        Self { enabled, mode }
    }

    pub fn mode(&self) -> &FilterMode {
        &self.mode
    }

    pub fn allows(&self, component: &str, level: Severity) -> bool {
        if !self.enabled {
            return false;
        }

        match &self.mode {
            FilterMode::NoFilter => true,
            FilterMode::Levels(levels) => levels.contains(&level),
            FilterMode::Rules(rules) => {
                let key = normalize_component(component);
                // 没有对应规则也没有 default 时拒绝发送
                rules
                    .get(&key)
                    .or_else(|| rules.get(DEFAULT_RULE_KEY))
                    .is_some_and(|levels| levels.contains(&level))
            }
        }
    }
}

fn parse_levels(levels: &[String]) -> HashSet<Severity> {
    levels.iter().filter_map(|level| level.parse().ok()).collect()
}

/// 组件名到配置键：所有 `DISK:<mount>` 归为 `filesystem`，其余转小写
pub fn normalize_component(component: &str) -> String {
    if component.starts_with("DISK:") {
        return "filesystem".to_string();
    }
    component.to_lowercase()
}
