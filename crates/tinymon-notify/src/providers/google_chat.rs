use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tinymon_types::{Alert, AlertLevel, Severity};
use tracing::info;

use super::{http_client, DEFAULT_TIMEOUT};
use crate::context::HostContext;
use crate::error::NotifyError;
use crate::filter::AlertFilter;
use crate::provider::Provider;

const HEADER_IMAGE_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/3/35/Tux.svg/1200px-Tux.svg.png";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleChatConfig {
    pub enabled: bool,
    pub webhook_url: String,
    pub levels: Vec<String>,
    pub rules: HashMap<String, Vec<String>>,
}

/// Google Chat 卡片消息
pub struct GoogleChatProvider {
    config: GoogleChatConfig,
    filter: AlertFilter,
    client: reqwest::Client,
}

impl GoogleChatProvider {
    pub fn new(config: GoogleChatConfig) -> Self {
        let filter = AlertFilter::from_config(config.enabled, &config.levels, &config.rules);
        Self {
            config,
            filter,
            client: http_client(DEFAULT_TIMEOUT),
        }
    }
}

/// cardId 只允许字母、数字、`_` 和 `-`
fn sanitize_card_id(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// (图标, 字体颜色, 标题)
fn decoration(alert: &Alert) -> (&'static str, &'static str, String) {
    match alert.level {
        AlertLevel::Critical => ("🚨", "#FF0000", format!("CRITICAL ALERT : {}", alert.component)),
        AlertLevel::Warning => ("⚠️", "#FFA500", format!("WARNING : {}", alert.component)),
        AlertLevel::Recovered => ("✅", "#00AA00", format!("RECOVERED : {}", alert.component)),
    }
}

fn build_card(alert: &Alert, ctx: &HostContext) -> serde_json::Value {
    let (icon, font_color, title) = decoration(alert);
    let card_id = format!(
        "tinymonitor-{}-{}",
        sanitize_card_id(&ctx.hostname),
        sanitize_card_id(&alert.component)
    );

    let details = json!({
        "header": "Incident Details",
        "widgets": [
            decorated_text("Monitored Component", format!("<b>{}</b>", alert.component), "MEMBERSHIP"),
            decorated_text(
                "Current Value",
                format!("<font color=\"{}\"><b>{}</b></font>", font_color, alert.value),
                "DESCRIPTION",
            ),
            decorated_text("Alert Level", format!("<b>{}</b>", alert.level), "STAR"),
        ]
    });

    let machine = json!({
        "header": "Machine Context",
        "collapsible": true,
        "uncollapsibleWidgetsCount": 2,
        "widgets": [
            text_paragraph(format!(
                "<b>Private IP:</b> {}<br><b>Public IP:</b> {}",
                ctx.private_ip, ctx.public_ip
            )),
            text_paragraph(format!(
                "<b>Load:</b> {}<br><b>Uptime:</b> {}",
                ctx.load_average, ctx.uptime
            )),
            text_paragraph(format!("<font color=\"#808080\">Alert Time: {}</font>", ctx.time)),
        ]
    });

    json!({
        "cardsV2": [{
            "cardId": card_id,
            "card": {
                "header": {
                    "title": format!("{} {}", icon, title),
                    "subtitle": format!("Server : {}", ctx.hostname),
                    "imageUrl": HEADER_IMAGE_URL,
                    "imageType": "CIRCLE"
                },
                "sections": [details, machine]
            }
        }]
    })
}

fn decorated_text(label: &str, text: String, icon: &str) -> serde_json::Value {
    json!({
        "decoratedText": {
            "topLabel": label,
            "text": text,
            "startIcon": { "knownIcon": icon }
        }
    })
}

fn text_paragraph(text: String) -> serde_json::Value {
    json!({ "textParagraph": { "text": text } })
}

#[async_trait]
impl Provider for GoogleChatProvider {
    fn name(&self) -> &str {
        "google_chat"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        if self.config.webhook_url.is_empty() {
            return Err(NotifyError::Config("no webhook_url provided".to_string()));
        }

        let ctx = HostContext::gather().await;
        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&build_card(alert, &ctx))
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(NotifyError::Status(response.status().as_u16()));
        }

        info!(provider = "google_chat", "Alert sent successfully");
        Ok(())
    }

    fn should_send(&self, component: &str, level: Severity) -> bool {
        self.filter.allows(component, level)
    }
}
