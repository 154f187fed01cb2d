use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tinymon_types::{Alert, AlertLevel, Severity};
use tracing::info;

use super::{http_client, markdown_body, DEFAULT_TIMEOUT};
use crate::context::HostContext;
use crate::error::NotifyError;
use crate::filter::AlertFilter;
use crate::provider::Provider;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NtfyConfig {
    pub enabled: bool,
    pub topic_url: String,
    /// 可选的访问令牌
    pub token: String,
    pub levels: Vec<String>,
    pub rules: HashMap<String, Vec<String>>,
}

/// ntfy 推送
pub struct NtfyProvider {
    config: NtfyConfig,
    filter: AlertFilter,
    client: reqwest::Client,
}

impl NtfyProvider {
    pub fn new(config: NtfyConfig) -> Self {
        let filter = AlertFilter::from_config(config.enabled, &config.levels, &config.rules);
        Self {
            config,
            filter,
            client: http_client(DEFAULT_TIMEOUT),
        }
    }
}

/// 级别对应的 (Priority, Tags) 头
fn priority_and_tags(level: AlertLevel) -> (&'static str, &'static str) {
    match level {
        AlertLevel::Critical => ("5", "rotating_light,critical"),
        AlertLevel::Warning => ("3", "warning"),
        AlertLevel::Recovered => ("2", "white_check_mark,recovered"),
    }
}

#[async_trait]
impl Provider for NtfyProvider {
    fn name(&self) -> &str {
        "ntfy"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        if self.config.topic_url.is_empty() {
            return Err(NotifyError::Config("no topic_url provided".to_string()));
        }

        let ctx = HostContext::gather().await;
        let (priority, tags) = priority_and_tags(alert.level);

        let mut request = self
            .client
            .post(&self.config.topic_url)
            .header("Title", alert.title.as_str())
            .header("Priority", priority)
            .header("Tags", tags)
            .header("Markdown", "yes")
            .body(markdown_body(alert, &ctx));

        if !self.config.token.is_empty() {
            request = request.bearer_auth(&self.config.token);
        }

        let response = request.send().await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(NotifyError::Status(response.status().as_u16()));
        }

        info!(provider = "ntfy", "Alert sent successfully");
        Ok(())
    }

    fn should_send(&self, component: &str, level: Severity) -> bool {
        self.filter.allows(component, level)
    }
}
