use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tinymon_types::{Alert, Severity};
use tracing::info;

use crate::context::HostContext;
use crate::error::NotifyError;
use crate::filter::AlertFilter;
use crate::provider::Provider;

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);
/// 隐式 TLS（SMTPS）端口
const IMPLICIT_TLS_PORT: u16 = 465;

/// 与服务器建立连接时的加密方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TlsMode {
    /// 连接即 TLS（SMTPS）
    Implicit,
    StartTls,
    /// 服务器支持 STARTTLS 时升级，否则明文
    Opportunistic,
}

fn tls_mode(port: u16, use_tls: bool) -> TlsMode {
    match (use_tls, port) {
        (true, IMPLICIT_TLS_PORT) => TlsMode::Implicit,
        (true, _) => TlsMode::StartTls,
        (false, _) => TlsMode::Opportunistic,
    }
}

/// 邮件配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: i64,
    pub user: String,
    pub password: String,
    pub from_addr: String,
    pub to_addrs: Vec<String>,
    pub use_tls: bool,
    pub levels: Vec<String>,
    pub rules: HashMap<String, Vec<String>>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from_addr: String::new(),
            to_addrs: Vec::new(),
            use_tls: true,
            levels: Vec::new(),
            rules: HashMap::new(),
        }
    }
}

pub struct SmtpProvider {
    config: SmtpConfig,
    filter: AlertFilter,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Self {
        let filter = AlertFilter::from_config(config.enabled, &config.levels, &config.rules);
        Self { config, filter }
    }

    fn validate(&self) -> Result<u16, NotifyError> {
        let c = &self.config;
        if c.host.is_empty()
            || c.user.is_empty()
            || c.password.is_empty()
            || c.from_addr.is_empty()
            || c.to_addrs.is_empty()
        {
            return Err(NotifyError::Config("missing SMTP configuration".to_string()));
        }

        u16::try_from(c.port)
            .ok()
            .filter(|port| *port > 0)
            .ok_or_else(|| NotifyError::Config(format!("invalid SMTP port {}", c.port)))
    }

    fn build_message(&self, alert: &Alert, ctx: &HostContext) -> Result<Message, NotifyError> {
        let from: Mailbox = parse_mailbox(&self.config.from_addr)?;
        let mut builder = Message::builder()
            .from(from)
            .subject(subject(alert, &ctx.hostname))
            .header(ContentType::TEXT_HTML);

        for to in &self.config.to_addrs {
            builder = builder.to(parse_mailbox(to)?);
        }

        builder
            .body(html_body(alert, ctx))
            .map_err(|e| NotifyError::Smtp(e.to_string()))
    }

    fn transport(&self, port: u16) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let host = self.config.host.as_str();
        let smtp_err = |e: lettre::transport::smtp::Error| NotifyError::Smtp(e.to_string());

        let builder = match tls_mode(port, self.config.use_tls) {
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(host).map_err(smtp_err)?,
            TlsMode::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).map_err(smtp_err)?
            }
            TlsMode::Opportunistic => {
                let params = TlsParameters::new(host.to_string()).map_err(smtp_err)?;
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                    .tls(Tls::Opportunistic(params))
            }
        };

        Ok(builder
            .port(port)
            .credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|_| NotifyError::Address(address.to_string()))
}

fn subject(alert: &Alert, hostname: &str) -> String {
    format!(
        "[{}] {} on {} - {}",
        alert.level, alert.component, hostname, alert.value
    )
}

fn html_body(alert: &Alert, ctx: &HostContext) -> String {
    format!(
        r#"<html>
<body>
    <h2>{title}</h2>
    <p><strong>Component:</strong> {component}</p>
    <p><strong>Value:</strong> {value}</p>
    <p><strong>Level:</strong> {level}</p>
    <hr>
    <h3>Machine Context</h3>
    <ul>
        <li><strong>Server:</strong> {host}</li>
        <li><strong>Private IP:</strong> {private_ip}</li>
        <li><strong>Public IP:</strong> {public_ip}</li>
        <li><strong>Load Avg:</strong> {load}</li>
        <li><strong>Uptime:</strong> {uptime}</li>
        <li><strong>Time:</strong> {time}</li>
    </ul>
</body>
</html>"#,
        title = alert.title,
        component = alert.component,
        value = alert.value,
        level = alert.level,
        host = ctx.hostname,
        private_ip = ctx.private_ip,
        public_ip = ctx.public_ip,
        load = ctx.load_average,
        uptime = ctx.uptime,
        time = ctx.time,
    )
}

#[async_trait]
impl Provider for SmtpProvider {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let port = self.validate()?;
        let ctx = HostContext::gather().await;

        let message = self.build_message(alert, &ctx)?;
        self.transport(port)?
            .send(message)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        info!(provider = "smtp", to = ?self.config.to_addrs, "Email sent");
        Ok(())
    }

    fn should_send(&self, component: &str, level: Severity) -> bool {
        self.filter.allows(component, level)
    }
}
