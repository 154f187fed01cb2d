use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tinymon_config::DispatchConfig;
use tinymon_notify::Provider;
use tinymon_types::{Alert, Severity};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 取消后等待在途发送结束的时间，超时即强制终止
const CANCEL_GRACE: Duration = Duration::from_secs(5);

/// 分发器参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub queue_size: usize,
    pub workers: usize,
    pub drain_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_size: 100,
            workers: 5,
            drain_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&DispatchConfig> for DispatcherConfig {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            queue_size: config.queue_size.max(1),
            workers: config.workers.max(1),
            drain_timeout: Duration::from_secs(config.drain_timeout),
        }
    }
}

/// 分发统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// 成功入队
    pub queued: u64,
    /// 队列已满或已关闭而丢弃
    pub dropped: u64,
    pub delivered: u64,
    pub failed: u64,
    /// 关闭超时后仍留在队列中的通知
    pub abandoned: u64,
}

#[derive(Default)]
struct Counters {
    queued: AtomicU64,
    dropped: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    abandoned: AtomicU64,
}

struct Task {
    provider: Arc<dyn Provider>,
    alert: Alert,
}

/// 把告警扇出到各通知渠道
///
/// 入队不会阻塞监控循环：队列有界，满了就丢弃。固定数量的工作任务
/// 从同一个队列取出通知并调用渠道发送，失败只记录日志，不重试。
pub struct Dispatcher {
    providers: Vec<Arc<dyn Provider>>,
    sender: StdMutex<Option<mpsc::Sender<Task>>>,
    receiver: Arc<Mutex<mpsc::Receiver<Task>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    cancel: CancellationToken,
    counters: Arc<Counters>,
    drain_timeout: Duration,
}

impl Dispatcher {
    /// 创建分发器并启动工作任务，必须在 tokio 运行时内调用
    pub fn new(providers: Vec<Arc<dyn Provider>>, config: DispatcherConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_size.max(1));
        let receiver = Arc::new(Mutex::new(rx));
        let cancel = CancellationToken::new();
        let counters = Arc::new(Counters::default());

        let workers = (0..config.workers.max(1))
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    receiver.clone(),
                    cancel.clone(),
                    counters.clone(),
                ))
            })
            .collect();

        debug!(
            providers = providers.len(),
            workers = config.workers,
            queue_size = config.queue_size,
            "Dispatcher started"
        );

        Self {
            providers,
            sender: StdMutex::new(Some(tx)),
            receiver,
            workers: Mutex::new(workers),
            cancel,
            counters,
            drain_timeout: config.drain_timeout,
        }
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    /// 非阻塞入队，返回是否成功
    pub fn enqueue(&self, provider: Arc<dyn Provider>, alert: Alert) -> bool {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = guard.as_ref() else {
            warn!(
                provider = provider.name(),
                component = %alert.component,
                "Dispatcher is shutting down, dropping alert"
            );
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        };

        match sender.try_send(Task { provider, alert }) {
            Ok(()) => {
                self.counters.queued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(task)) => {
                warn!(
                    provider = task.provider.name(),
                    component = %task.alert.component,
                    "Alert queue full, dropping alert"
                );
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(TrySendError::Closed(task)) => {
                warn!(
                    provider = task.provider.name(),
                    component = %task.alert.component,
                    "Alert queue closed, dropping alert"
                );
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// 发给所有接收该组件、该级别的渠道，返回入队数量
    pub fn send_alert(&self, component: &str, level: Severity, value: &str) -> usize {
        let alert = Alert::new(component, level, value);
        let mut queued = 0;

        for provider in &self.providers {
            if !provider.should_send(component, level) {
                continue;
            }
            info!(
                provider = provider.name(),
                component,
                level = %level,
                "Triggering alert"
            );
            if self.enqueue(provider.clone(), alert.clone()) {
                queued += 1;
            }
        }

        queued
    }

    /// 恢复通知只发给原本会收到该级别告警的渠道
    pub fn send_recovery(&self, component: &str, previous: Severity, value: &str) -> usize {
        let alert = Alert::recovery(component, previous, value);
        let mut queued = 0;

        for provider in &self.providers {
            if !provider.should_send(component, previous) {
                continue;
            }
            info!(
                provider = provider.name(),
                component,
                previous_level = %previous,
                "Triggering recovery"
            );
            if self.enqueue(provider.clone(), alert.clone()) {
                queued += 1;
            }
        }

        queued
    }

    /// 停止接收新通知，在超时时间内发完队列中剩余的通知
    ///
    /// 超时后取消工作任务：在途的发送会完成，不再取新通知，
    /// 剩余通知被丢弃并计入 `abandoned`。重复调用无副作用。
    pub async fn shutdown(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sender) = sender {
            let pending = sender.max_capacity() - sender.capacity();
            info!(pending, "Shutting down dispatcher");
            // 关闭队列，工作任务取完剩余通知后退出
            drop(sender);
        }

        let handles = std::mem::take(&mut *self.workers.lock().await);
        if handles.is_empty() {
            return;
        }

        // 超时时间过大无法表示截止时刻时，等待队列完全发完
        let deadline = Instant::now().checked_add(self.drain_timeout);
        let mut remaining = Vec::new();
        for mut handle in handles {
            match deadline {
                Some(deadline) => {
                    if timeout_at(deadline, &mut handle).await.is_err() {
                        remaining.push(handle);
                    }
                }
                None => {
                    let _ = (&mut handle).await;
                }
            }
        }

        if !remaining.is_empty() {
            warn!(
                workers = remaining.len(),
                timeout = ?self.drain_timeout,
                "Dispatcher drain timed out, cancelling workers"
            );
            self.cancel.cancel();

            for mut handle in remaining {
                if timeout(CANCEL_GRACE, &mut handle).await.is_err() {
                    warn!("Dispatch worker did not stop in time, aborting");
                    handle.abort();
                    let _ = handle.await;
                }
            }
        }

        let mut abandoned = 0u64;
        let mut rx = self.receiver.lock().await;
        while rx.try_recv().is_ok() {
            abandoned += 1;
        }
        if abandoned > 0 {
            warn!(abandoned, "Alerts abandoned at shutdown");
            self.counters.abandoned.fetch_add(abandoned, Ordering::Relaxed);
        }

        info!("Dispatcher stopped");
    }

    pub fn stats(&self) -> DispatchStats {
        let c = &self.counters;
        DispatchStats {
            queued: c.queued.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
            delivered: c.delivered.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
            abandoned: c.abandoned.load(Ordering::Relaxed),
        }
    }
}

async fn worker(
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Task>>>,
    cancel: CancellationToken,
    counters: Arc<Counters>,
) {
    loop {
        let task = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            task = async { receiver.lock().await.recv().await } => task,
        };

        let Some(task) = task else {
            break;
        };

        match task.provider.send(&task.alert).await {
            Ok(()) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    provider = task.provider.name(),
                    component = %task.alert.component,
                    error = %e,
                    "Failed to send alert"
                );
            }
        }
    }

    debug!(worker = id, "Dispatch worker stopped");
}
