use std::time::Instant;

use tinymon_types::MetricResult;
use tracing::debug;

use crate::collector::{classify, Collector};
use crate::config::{IoConfig, IoThreshold};

const DISKSTATS_PATH: &str = "/proc/diskstats";
const SECTOR_SIZE: u64 = 512;

/// 累计读写字节数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// 磁盘 I/O 速率采集器（读写合计）
pub struct IoCollector {
    config: IoConfig,
    last: Option<(IoCounters, Instant)>,
}

impl IoCollector {
    pub fn new(config: IoConfig) -> Self {
        let last = read_counters().map(|counters| (counters, Instant::now()));
        Self { config, last }
    }

    /// 根据新样本计算速率；首个样本只作为基线
    fn observe(&mut self, current: IoCounters, now: Instant) -> Option<MetricResult> {
        let Some((previous, last_time)) = self.last.replace((current, now)) else {
            return None;
        };

        let elapsed = now.duration_since(last_time).as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }

        // 计数器回绕或设备变化时按 0 处理
        let read_speed = current.read_bytes.saturating_sub(previous.read_bytes) as f64 / elapsed;
        let write_speed = current.write_bytes.saturating_sub(previous.write_bytes) as f64 / elapsed;

        let max_speed = self
            .config
            .max_speed
            .as_ref()
            .map(|value| parse_threshold(Some(value), None))
            .filter(|value| value.is_finite());
        let warning = parse_threshold(self.config.warning.as_ref(), max_speed);
        let critical = parse_threshold(self.config.critical.as_ref(), max_speed);

        let level = classify(read_speed + write_speed, warning, critical);
        Some(MetricResult::new(
            "I/O",
            level,
            format!("R: {} W: {}", format_bytes(read_speed), format_bytes(write_speed)),
        ))
    }
}

impl Collector for IoCollector {
    fn name(&self) -> &str {
        "io"
    }

    fn check(&mut self) -> Vec<MetricResult> {
        let Some(current) = read_counters() else {
            debug!("Disk I/O counters unavailable");
            return Vec::new();
        };

        self.observe(current, Instant::now()).into_iter().collect()
    }

    fn duration(&self) -> i64 {
        self.config.duration
    }
}

fn read_counters() -> Option<IoCounters> {
    let content = std::fs::read_to_string(DISKSTATS_PATH).ok()?;
    parse_diskstats(&content)
}

/// 解析 `/proc/diskstats`，忽略 loop/ram/zram 虚拟设备
pub(crate) fn parse_diskstats(content: &str) -> Option<IoCounters> {
    let mut total = IoCounters::default();
    let mut found = false;

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }

        let name = fields[2];
        if name.starts_with("loop") || name.starts_with("ram") || name.starts_with("zram") {
            continue;
        }

        let (Ok(sectors_read), Ok(sectors_written)) =
            (fields[5].parse::<u64>(), fields[9].parse::<u64>())
        else {
            continue;
        };

        total.read_bytes += sectors_read * SECTOR_SIZE;
        total.write_bytes += sectors_written * SECTOR_SIZE;
        found = true;
    }

    found.then_some(total)
}

/// 解析阈值；缺失或无法解析时返回正无穷（永不触发）
pub fn parse_threshold(value: Option<&IoThreshold>, max_speed: Option<f64>) -> f64 {
    match value {
        None => f64::INFINITY,
        Some(IoThreshold::Number(n)) => *n,
        Some(IoThreshold::Text(text)) => parse_text_threshold(text, max_speed),
    }
}

fn parse_text_threshold(text: &str, max_speed: Option<f64>) -> f64 {
    let value = text.trim().to_ascii_uppercase();

    if let Some(percent) = value.strip_suffix('%') {
        return match (max_speed, percent.trim().parse::<f64>()) {
            (Some(max), Ok(percent)) => max * percent / 100.0,
            _ => f64::INFINITY,
        };
    }

    const UNITS: [(&str, f64); 4] = [
        ("K", 1024.0),
        ("M", 1024.0 * 1024.0),
        ("G", 1024.0 * 1024.0 * 1024.0),
        ("T", 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ];

    let number = value.strip_suffix('B').unwrap_or(&value);
    for (unit, multiplier) in UNITS {
        if let Some(num) = number.strip_suffix(unit) {
            return num
                .trim()
                .parse::<f64>()
                .map(|n| n * multiplier)
                .unwrap_or(f64::INFINITY);
        }
    }

    number.trim().parse::<f64>().unwrap_or(f64::INFINITY)
}

/// 以 1024 为进制格式化速率，例如 `1.5MB/s`
pub fn format_bytes(mut size: f64) -> String {
    const LABELS: [&str; 5] = ["", "K", "M", "G", "T"];
    let mut n = 0;
    while size > 1024.0 && n < LABELS.len() - 1 {
        size /= 1024.0;
        n += 1;
    }
    format!("{:.1}{}B/s", size, LABELS[n])
}
