pub mod alert;
pub mod metric;
pub mod severity;

pub use alert::Alert;
pub use metric::{AlertState, MetricResult};
pub use severity::{AlertLevel, ParseSeverityError, Severity};
