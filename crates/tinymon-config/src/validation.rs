use std::collections::HashMap;
use std::fmt;

use tinymon_types::Severity;

use crate::model::{Config, ALERT_ONCE};

/// 所有以秒为单位的时间配置的上限（365 天）
pub const MAX_SECONDS: i64 = 365 * 24 * 3600;

/// 单条校验错误，显示为 `field: message`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// 一次校验收集到的全部错误
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// 是否存在指定字段的错误
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationError::new(field, message));
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl Config {
    /// 校验配置，收集所有错误而不是遇到第一个就返回
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::default();

        if self.refresh <= 0 {
            errs.push("refresh", "must be greater than 0");
        }
        if self.refresh > MAX_SECONDS {
            errs.push("refresh", too_large());
        }
        if self.cooldown < ALERT_ONCE {
            errs.push("cooldown", "must be >= -1 (-1 = alert once per incident)");
        }
        if self.cooldown > MAX_SECONDS {
            errs.push("cooldown", too_large());
        }
        self.validate_durations(&mut errs);

        if self.cpu.enabled {
            validate_thresholds(&mut errs, "cpu", self.cpu.warning, self.cpu.critical);
        }
        if self.memory.enabled {
            validate_thresholds(&mut errs, "memory", self.memory.warning, self.memory.critical);
        }
        if self.filesystem.enabled {
            validate_thresholds(
                &mut errs,
                "filesystem",
                self.filesystem.warning,
                self.filesystem.critical,
            );
        }

        self.validate_load(&mut errs);
        self.validate_alerts(&mut errs);

        if self.dispatch.queue_size == 0 {
            errs.push("dispatch.queue_size", "must be greater than 0");
        }
        if self.dispatch.workers == 0 {
            errs.push("dispatch.workers", "must be greater than 0");
        }
        if self.dispatch.drain_timeout > MAX_SECONDS.unsigned_abs() {
            errs.push("dispatch.drain_timeout", too_large());
        }

        if errs.is_empty() {
            Ok(())
        } else {
            Err(errs)
        }
    }

    fn validate_durations(&self, errs: &mut ValidationErrors) {
        let durations = [
            ("cpu.duration", self.cpu.enabled, self.cpu.duration),
            ("memory.duration", self.memory.enabled, self.memory.duration),
            ("filesystem.duration", self.filesystem.enabled, self.filesystem.duration),
            ("load.duration", self.load.enabled, self.load.duration),
            ("io.duration", self.io.enabled, self.io.duration),
            ("reboot.duration", self.reboot.enabled, self.reboot.duration),
        ];
        for (field, enabled, duration) in durations {
            if enabled && duration > MAX_SECONDS {
                errs.push(field, too_large());
            }
        }
    }

    fn validate_load(&self, errs: &mut ValidationErrors) {
        let load = &self.load;
        if !load.enabled {
            return;
        }

        if load.auto {
            if load.warning_ratio <= 0.0 {
                errs.push("load.warning_ratio", "must be greater than 0");
            }
            if load.critical_ratio <= 0.0 {
                errs.push("load.critical_ratio", "must be greater than 0");
            }
            if load.warning_ratio >= load.critical_ratio {
                errs.push("load", "warning_ratio must be less than critical_ratio");
            }
        } else {
            if load.warning <= 0.0 {
                errs.push("load.warning", "must be greater than 0");
            }
            if load.critical <= 0.0 {
                errs.push("load.critical", "must be greater than 0");
            }
            if load.warning >= load.critical {
                errs.push("load", "warning must be less than critical");
            }
        }
    }

    fn validate_alerts(&self, errs: &mut ValidationErrors) {
        let alerts = &self.alerts;

        let chat = &alerts.google_chat;
        if chat.enabled {
            require(errs, "alerts.google_chat.webhook_url", &chat.webhook_url, "google_chat");
            validate_levels(errs, "alerts.google_chat", &chat.levels, &chat.rules);
        }

        let ntfy = &alerts.ntfy;
        if ntfy.enabled {
            require(errs, "alerts.ntfy.topic_url", &ntfy.topic_url, "ntfy");
            validate_levels(errs, "alerts.ntfy", &ntfy.levels, &ntfy.rules);
        }

        let smtp = &alerts.smtp;
        if smtp.enabled {
            require(errs, "alerts.smtp.host", &smtp.host, "smtp");
            if !(1..=65535).contains(&smtp.port) {
                errs.push("alerts.smtp.port", "must be between 1 and 65535");
            }
            require(errs, "alerts.smtp.user", &smtp.user, "smtp");
            require(errs, "alerts.smtp.password", &smtp.password, "smtp");
            require(errs, "alerts.smtp.from_addr", &smtp.from_addr, "smtp");
            if smtp.to_addrs.is_empty() {
                errs.push("alerts.smtp.to_addrs", "required when smtp is enabled");
            }
            validate_levels(errs, "alerts.smtp", &smtp.levels, &smtp.rules);
        }

        let webhook = &alerts.webhook;
        if webhook.enabled {
            require(errs, "alerts.webhook.url", &webhook.url, "webhook");
            if webhook.timeout <= 0 {
                errs.push("alerts.webhook.timeout", "must be greater than 0");
            }
            validate_levels(errs, "alerts.webhook", &webhook.levels, &webhook.rules);
        }

        let gotify = &alerts.gotify;
        if gotify.enabled {
            require(errs, "alerts.gotify.url", &gotify.url, "gotify");
            require(errs, "alerts.gotify.token", &gotify.token, "gotify");
            validate_levels(errs, "alerts.gotify", &gotify.levels, &gotify.rules);
        }
    }
}

fn too_large() -> String {
    format!("must be at most {} seconds (365 days)", MAX_SECONDS)
}

fn require(errs: &mut ValidationErrors, field: &str, value: &str, provider: &str) {
    if value.is_empty() {
        errs.push(field, format!("required when {} is enabled", provider));
    }
}

fn validate_thresholds(errs: &mut ValidationErrors, name: &str, warning: f64, critical: f64) {
    if !(0.0..=100.0).contains(&warning) {
        errs.push(
            format!("{}.warning", name),
            format!("must be between 0 and 100 (got {:.1})", warning),
        );
    }
    if !(0.0..=100.0).contains(&critical) {
        errs.push(
            format!("{}.critical", name),
            format!("must be between 0 and 100 (got {:.1})", critical),
        );
    }
    if warning >= critical {
        errs.push(
            name,
            format!(
                "warning ({:.1}) must be less than critical ({:.1})",
                warning, critical
            ),
        );
    }
}

fn validate_levels(
    errs: &mut ValidationErrors,
    prefix: &str,
    levels: &[String],
    rules: &HashMap<String, Vec<String>>,
) {
    for level in levels {
        if level.parse::<Severity>().is_err() {
            errs.push(
                format!("{}.levels", prefix),
                format!("unknown level '{}' (expected WARNING or CRITICAL)", level),
            );
        }
    }

    // 按键排序，保证错误顺序稳定
    let mut keys: Vec<&String> = rules.keys().collect();
    keys.sort();
    for key in keys {
        for level in &rules[key] {
            if level.parse::<Severity>().is_err() {
                errs.push(
                    format!("{}.rules.{}", prefix, key),
                    format!("unknown level '{}' (expected WARNING or CRITICAL)", level),
                );
            }
        }
    }
}
