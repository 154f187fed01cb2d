use std::net::UdpSocket;
use std::time::Duration;

use sysinfo::System;
use tracing::debug;

const PUBLIC_IP_URL: &str = "https://api.ipify.org";
const PUBLIC_IP_TIMEOUT: Duration = Duration::from_secs(3);
const NOT_AVAILABLE: &str = "N/A";

/// 通知中附带的主机上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    pub hostname: String,
    pub private_ip: String,
    pub public_ip: String,
    pub load_average: String,
    pub uptime: String,
    /// 本地时间 `YYYY-MM-DD HH:MM:SS`
    pub time: String,
}

impl HostContext {
    /// 采集当前主机信息，任何一项失败都用占位值代替
    pub async fn gather() -> Self {
        Self {
            hostname: hostname(),
            private_ip: private_ip(),
            public_ip: public_ip().await,
            load_average: load_average(),
            uptime: format_uptime(System::uptime()),
            time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

pub fn hostname() -> String {
    System::host_name().unwrap_or_else(|| "unknown".to_string())
}

/// 通过 UDP connect 获取默认路由的本地地址，不会真正发送数据
fn private_ip() -> String {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string())
}

async fn public_ip() -> String {
    let client = match reqwest::Client::builder().timeout(PUBLIC_IP_TIMEOUT).build() {
        Ok(client) => client,
        Err(_) => return NOT_AVAILABLE.to_string(),
    };

    let result = async {
        client
            .get(PUBLIC_IP_URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
    .await;

    match result {
        Ok(body) => body.trim().to_string(),
        Err(e) => {
            debug!(error = %e, "Failed to resolve public IP");
            NOT_AVAILABLE.to_string()
        }
    }
}

fn load_average() -> String {
    if cfg!(windows) {
        return NOT_AVAILABLE.to_string();
    }
    let load = System::load_average();
    format!("{:.2}, {:.2}, {:.2}", load.one, load.five, load.fifteen)
}

pub(crate) fn format_uptime(seconds: u64) -> String {
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}
