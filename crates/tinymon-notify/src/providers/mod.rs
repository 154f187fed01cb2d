//! 内置通知渠道

mod google_chat;
mod gotify;
mod ntfy;
mod smtp;
mod webhook;

pub use google_chat::{GoogleChatConfig, GoogleChatProvider};
pub use gotify::{GotifyConfig, GotifyProvider};
pub use ntfy::{NtfyConfig, NtfyProvider};
pub use smtp::{SmtpConfig, SmtpProvider};
pub use webhook::{WebhookConfig, WebhookProvider};

use std::time::Duration;

use tinymon_types::Alert;
use tracing::warn;

use crate::context::HostContext;

/// HTTP 渠道的默认请求超时
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(
                error = %e,
                ?timeout,
                "Failed to build HTTP client, falling back to defaults without request timeout"
            );
            reqwest::Client::new()
        }
    }
}

/// ntfy 与 gotify 共用的 Markdown 正文
pub(crate) fn markdown_body(alert: &Alert, ctx: &HostContext) -> String {
    format!(
        "**Component** : {}\n\
         **Value**     : {}\n\
         **Level**     : {}\n\
         \n\
         __Machine Context__\n\
         🖥️ **Server**    : `{}`\n\
         🏠 **Private IP**: `{}`\n\
         🌍 **Public IP** : `{}`\n\
         ⚙️ **Load Avg**  : `{}`\n\
         ⏱️ **Uptime**    : `{}`\n\
         🕒 **Time**      : {}",
        alert.component,
        alert.value,
        alert.level,
        ctx.hostname,
        ctx.private_ip,
        ctx.public_ip,
        ctx.load_average,
        ctx.uptime,
        ctx.time,
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use crate::context::HostContext;

    /// 捕获到的一次 HTTP 请求
    #[derive(Debug)]
    pub struct CapturedRequest {
        pub request_line: String,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl CapturedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }
    }

    pub fn host_context() -> HostContext {
        HostContext {
            hostname: "web-01".to_string(),
            private_ip: "10.0.0.5".to_string(),
            public_ip: "203.0.113.7".to_string(),
            load_average: "0.52, 0.48, 0.40".to_string(),
            uptime: "12h 3m".to_string(),
            time: "2024-05-01 10:00:00".to_string(),
        }
    }

    /// 在本地端口上接收一个请求，并以指定状态码应答
    pub async fn serve_once(status: u16) -> (String, JoinHandle<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let header_end = loop {
                let n = stream.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let mut lines = head.split("\r\n");
            let request_line = lines.next().unwrap_or_default().to_string();
            let headers: Vec<(String, String)> = lines
                .filter_map(|line| line.split_once(':'))
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .collect();

            let content_length = headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0);

            while buf.len() < header_end + content_length {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
            let response = format!(
                "HTTP/1.1 {} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();

            CapturedRequest {
                request_line,
                headers,
                body,
            }
        });

        (format!("http://{}", addr), handle)
    }
}
