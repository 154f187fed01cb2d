use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tinymon_types::{Alert, AlertLevel, Severity};
use tracing::info;

use super::{http_client, markdown_body, DEFAULT_TIMEOUT};
use crate::context::HostContext;
use crate::error::NotifyError;
use crate::filter::AlertFilter;
use crate::provider::Provider;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GotifyConfig {
    pub enabled: bool,
    /// 服务器地址，可以省略 `/message` 后缀
    pub url: String,
    /// 应用令牌
    pub token: String,
    pub levels: Vec<String>,
    pub rules: HashMap<String, Vec<String>>,
}

pub struct GotifyProvider {
    config: GotifyConfig,
    filter: AlertFilter,
    client: reqwest::Client,
}

impl GotifyProvider {
    pub fn new(config: GotifyConfig) -> Self {
        let filter = AlertFilter::from_config(config.enabled, &config.levels, &config.rules);
        Self {
            config,
            filter,
            client: http_client(DEFAULT_TIMEOUT),
        }
    }
}

fn message_url(url: &str) -> String {
    if url.ends_with("/message") {
        return url.to_string();
    }
    if url.ends_with('/') {
        format!("{}message", url)
    } else {
        format!("{}/message", url)
    }
}

fn priority(level: AlertLevel) -> u8 {
    match level {
        AlertLevel::Critical => 8,
        AlertLevel::Warning => 5,
        AlertLevel::Recovered => 3,
    }
}

fn build_payload(alert: &Alert, ctx: &HostContext) -> serde_json::Value {
    json!({
        "title": alert.title,
        "message": markdown_body(alert, ctx),
        "priority": priority(alert.level),
        "extras": {
            "client::display": {
                "contentType": "text/markdown"
            }
        }
    })
}

#[async_trait]
impl Provider for GotifyProvider {
    fn name(&self) -> &str {
        "gotify"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        if self.config.url.is_empty() || self.config.token.is_empty() {
            return Err(NotifyError::Config("no url or token provided".to_string()));
        }

        let ctx = HostContext::gather().await;
        let response = self
            .client
            .post(message_url(&self.config.url))
            .header("X-Gotify-Key", &self.config.token)
            .json(&build_payload(alert, &ctx))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status().as_u16()));
        }

        info!(provider = "gotify", "Alert sent successfully");
        Ok(())
    }

    fn should_send(&self, component: &str, level: Severity) -> bool {
        self.filter.allows(component, level)
    }
}
