//! Service telemetry.
//!
//! Lock-free counters recorded by the service and its worker, and
//! point-in-time snapshots for reporting.
//!
//! ```text
//! StaticMapService ─┐
//!                   ├─► ServiceMetrics ─────► MetricsSnapshot ─────► /status
//! GenerationWorker ─┘   (atomic counters)     (point-in-time copy)
//! ```

mod metrics;
mod snapshot;

pub use metrics::ServiceMetrics;
pub use snapshot::MetricsSnapshot;
