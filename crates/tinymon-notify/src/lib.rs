pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod provider;
pub mod providers;

pub use config::{AlertsConfig, PROVIDER_NAMES};
pub use context::HostContext;
pub use error::NotifyError;
pub use filter::{normalize_component, AlertFilter, FilterMode};
pub use provider::Provider;
pub use providers::{
    GoogleChatConfig, GoogleChatProvider, GotifyConfig, GotifyProvider, NtfyConfig, NtfyProvider,
    SmtpConfig, SmtpProvider, WebhookConfig, WebhookProvider,
};
