use std::io;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// 关闭信号类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGTERM
    Term,
    /// SIGINT - Ctrl+C
    Interrupt,
}

/// 等待系统信号
#[cfg(unix)]
pub async fn wait_for_signal() -> io::Result<ShutdownSignal> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM");
            Ok(ShutdownSignal::Term)
        }
        _ = sigint.recv() => {
            info!("Received SIGINT");
            Ok(ShutdownSignal::Interrupt)
        }
    }
}

/// 等待系统信号（Windows 版本）
#[cfg(not(unix))]
pub async fn wait_for_signal() -> io::Result<ShutdownSignal> {
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C");
    Ok(ShutdownSignal::Interrupt)
}

/// 收到关闭信号时取消 `token`
///
/// 无法注册信号处理时只记录错误，不会取消。
pub fn cancel_on_signal(token: CancellationToken) {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(signal) => {
                info!(?signal, "Shutting down");
                token.cancel();
            }
            Err(e) => error!(error = %e, "Failed to install signal handler"),
        }
    });
}
