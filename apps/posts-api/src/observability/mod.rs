//! Observability module - Prometheus request metrics.

mod metrics;

pub use metrics::{Metrics, MetricsMiddleware};
