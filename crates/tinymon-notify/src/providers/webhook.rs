use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tinymon_types::{Alert, Severity};
use tracing::info;

use super::{http_client, DEFAULT_TIMEOUT};
use crate::context::HostContext;
use crate::error::NotifyError;
use crate::filter::AlertFilter;
use crate::provider::Provider;

/// 通用 Webhook 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub url: String,
    /// 附加请求头
    pub headers: HashMap<String, String>,
    /// 请求超时（秒），非正数时使用 10 秒
    pub timeout: i64,
    pub levels: Vec<String>,
    pub rules: HashMap<String, Vec<String>>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            headers: HashMap::new(),
            timeout: 10,
            levels: Vec::new(),
            rules: HashMap::new(),
        }
    }
}

pub struct WebhookProvider {
    config: WebhookConfig,
    filter: AlertFilter,
    client: reqwest::Client,
}

impl WebhookProvider {
    pub fn new(config: WebhookConfig) -> Self {
        let filter = AlertFilter::from_config(config.enabled, &config.levels, &config.rules);
        let timeout = u64::try_from(config.timeout)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self {
            config,
            filter,
            client: http_client(timeout),
        }
    }

    fn has_content_type(&self) -> bool {
        self.config
            .headers
            .keys()
            .any(|key| key.eq_ignore_ascii_case("content-type"))
    }
}

fn build_payload(alert: &Alert, ctx: &HostContext, timestamp: String) -> serde_json::Value {
    json!({
        "timestamp": timestamp,
        "alert": {
            "level": alert.level,
            "component": alert.component,
            "value": alert.value,
            "title": alert.title,
            "message": alert.message,
        },
        "host": {
            "hostname": ctx.hostname,
            "ip_private": ctx.private_ip,
            "ip_public": ctx.public_ip,
            "uptime": ctx.uptime,
            "load_average": ctx.load_average,
        }
    })
}

#[async_trait]
impl Provider for WebhookProvider {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        if self.config.url.is_empty() {
            return Err(NotifyError::Config("no url provided".to_string()));
        }

        let ctx = HostContext::gather().await;
        let timestamp = chrono::Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        let body = serde_json::to_vec(&build_payload(alert, &ctx, timestamp))?;

        let mut request = self.client.post(&self.config.url);
        for (key, value) in &self.config.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if !self.has_content_type() {
            request = request.header("Content-Type", "application/json");
        }

        let response = request.body(body).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status().as_u16()));
        }

        info!(provider = "webhook", "Alert sent successfully");
        Ok(())
    }

    fn should_send(&self, component: &str, level: Severity) -> bool {
        self.filter.allows(component, level)
    }
}
