/// 通知错误
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to send alert: status {0}")]
    Status(u16),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Config(String),

    #[error("invalid email address: {0}")]
    Address(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}
