pub mod buffer;
pub mod collectors;
pub mod registry;
pub mod reporter;
pub mod sink;

pub use buffer::{MetricBuffer, NO_METHOD, encode_line};
pub use registry::{MetricsSnapshot, ServiceMetrics};
pub use reporter::{Reporter, ReporterHandle};
pub use sink::{HttpSink, MetricsConfig, MetricsSink};
