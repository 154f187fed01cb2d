use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::provider::Provider;
use crate::providers::{
    GoogleChatConfig, GoogleChatProvider, GotifyConfig, GotifyProvider, NtfyConfig, NtfyProvider,
    SmtpConfig, SmtpProvider, WebhookConfig, WebhookProvider,
};

/// 可用的渠道名称
pub const PROVIDER_NAMES: [&str; 5] = ["ntfy", "smtp", "google_chat", "webhook", "gotify"];

/// `[alerts]` 配置段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// 是否发送恢复通知
    pub send_recovery: bool,
    pub google_chat: GoogleChatConfig,
    pub ntfy: NtfyConfig,
    pub smtp: SmtpConfig,
    pub webhook: WebhookConfig,
    pub gotify: GotifyConfig,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            send_recovery: true,
            google_chat: GoogleChatConfig::default(),
            ntfy: NtfyConfig::default(),
            smtp: SmtpConfig::default(),
            webhook: WebhookConfig::default(),
            gotify: GotifyConfig::default(),
        }
    }
}

impl AlertsConfig {
    /// 创建所有已启用的渠道
    ///
    /// `only` 限定单个渠道（不区分大小写，接受 `googlechat` 和 `email` 别名），
    /// 渠道未启用时结果为空。
    pub fn build_providers(&self, only: Option<&str>) -> Vec<Arc<dyn Provider>> {
        let only = only.map(str::to_lowercase);
        let wanted = |names: &[&str]| match &only {
            None => true,
            Some(name) => names.contains(&name.as_str()),
        };

        let mut providers: Vec<Arc<dyn Provider>> = Vec::new();

        if self.google_chat.enabled && wanted(&["google_chat", "googlechat"]) {
            providers.push(Arc::new(GoogleChatProvider::new(self.google_chat.clone())));
            info!(provider = "google_chat", "Alert provider loaded");
        }
        if self.ntfy.enabled && wanted(&["ntfy"]) {
            providers.push(Arc::new(NtfyProvider::new(self.ntfy.clone())));
            info!(provider = "ntfy", "Alert provider loaded");
        }
        if self.smtp.enabled && wanted(&["smtp", "email"]) {
            providers.push(Arc::new(SmtpProvider::new(self.smtp.clone())));
            info!(provider = "smtp", "Alert provider loaded");
        }
        if self.webhook.enabled && wanted(&["webhook"]) {
            providers.push(Arc::new(WebhookProvider::new(self.webhook.clone())));
            info!(provider = "webhook", "Alert provider loaded");
        }
        if self.gotify.enabled && wanted(&["gotify"]) {
            providers.push(Arc::new(GotifyProvider::new(self.gotify.clone())));
            info!(provider = "gotify", "Alert provider loaded");
        }

        providers
    }

    /// 已启用渠道的名称
    pub fn enabled_providers(&self) -> Vec<&'static str> {
        let flags = [
            ("google_chat", self.google_chat.enabled),
            ("ntfy", self.ntfy.enabled),
            ("smtp", self.smtp.enabled),
            ("webhook", self.webhook.enabled),
            ("gotify", self.gotify.enabled),
        ];
        flags
            .into_iter()
            .filter_map(|(name, enabled)| enabled.then_some(name))
            .collect()
    }
}
