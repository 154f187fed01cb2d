pub mod builder;
pub mod cooldown;
pub mod dispatcher;
pub mod monitor;
pub mod tracker;

pub use cooldown::{CooldownGate, CooldownPolicy};
pub use dispatcher::{DispatchStats, Dispatcher, DispatcherConfig};
pub use monitor::{Monitor, MonitorSettings};
pub use tracker::{Decision, StateTracker};
