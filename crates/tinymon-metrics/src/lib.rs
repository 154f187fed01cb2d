pub mod collector;
pub mod config;
pub mod cpu;
pub mod disk;
pub mod io;
pub mod load;
pub mod memory;
pub mod reboot;

pub use collector::{classify, Collector};
pub use config::{FilesystemConfig, IoConfig, IoThreshold, LoadConfig, MetricConfig, RebootConfig};
pub use cpu::CpuCollector;
pub use disk::DiskCollector;
pub use io::IoCollector;
pub use load::LoadCollector;
pub use memory::MemoryCollector;
pub use reboot::RebootCollector;
