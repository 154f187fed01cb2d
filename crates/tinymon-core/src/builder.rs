use std::sync::Arc;
use std::time::Duration;

use tinymon_config::Config;
use tinymon_metrics::{
    Collector, CpuCollector, DiskCollector, IoCollector, LoadCollector, MemoryCollector,
    RebootCollector,
};
use tracing::info;

use crate::cooldown::CooldownPolicy;
use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::monitor::{Monitor, MonitorSettings};

/// 按配置创建已启用的采集器
pub fn collectors_from_config(config: &Config) -> Vec<Box<dyn Collector>> {
    let mut collectors: Vec<Box<dyn Collector>> = Vec::new();

    if config.cpu.enabled {
        collectors.push(Box::new(CpuCollector::new(config.cpu.clone())));
    }
    if config.memory.enabled {
        collectors.push(Box::new(MemoryCollector::new(config.memory.clone())));
    }
    if config.filesystem.enabled {
        collectors.push(Box::new(DiskCollector::new(config.filesystem.clone())));
    }
    if config.load.enabled {
        collectors.push(Box::new(LoadCollector::new(config.load.clone())));
    }
    if config.reboot.enabled {
        collectors.push(Box::new(RebootCollector::new(config.reboot.clone())));
    }
    if config.io.enabled {
        collectors.push(Box::new(IoCollector::new(config.io.clone())));
    }

    collectors
}

impl MonitorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            refresh: Duration::from_secs(config.refresh.max(1).unsigned_abs()),
            cooldown: CooldownPolicy::from_secs(config.cooldown),
            send_recovery: config.alerts.send_recovery,
        }
    }
}

impl Monitor {
    /// 根据配置组装采集器、通知渠道和分发器，必须在 tokio 运行时内调用
    pub fn from_config(config: &Config) -> Self {
        let collectors = collectors_from_config(config);
        let providers = config.alerts.build_providers(None);
        info!(
            collectors = collectors.len(),
            providers = providers.len(),
            "Monitor configured"
        );

        let dispatcher = Arc::new(Dispatcher::new(
            providers,
            DispatcherConfig::from(&config.dispatch),
        ));
        Self::new(collectors, dispatcher, MonitorSettings::from_config(config))
    }
}
