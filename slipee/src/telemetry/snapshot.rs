//! Point-in-time metrics snapshot.

use std::fmt;
use std::time::Duration;

/// Immutable copy of the service counters.
#[derive(Clone, Debug, Default)]
pub struct MetricsSnapshot {
    /// How long the service has been running
    pub uptime: Duration,

    // === Requests ===
    pub requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,

    // === Queue ===
    pub enqueued: u64,
    /// Dropped by `stitch` because the queue was full
    pub dropped: u64,
    /// Refused by `queue` because the queue was full
    pub rejected: u64,
    pub queue_depth: usize,

    // === Generation ===
    pub generated: u64,
    pub failed: u64,
    pub coalesced: u64,
    pub tiles_fetched: u64,
    pub total_generation_time_ms: u64,
}

impl MetricsSnapshot {
    /// Cache hit rate (0.0 - 1.0).
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// Average generation time in milliseconds.
    pub fn average_generation_ms(&self) -> f64 {
        if self.generated == 0 {
            0.0
        } else {
            self.total_generation_time_ms as f64 / self.generated as f64
        }
    }

    pub fn uptime_human(&self) -> String {
        format_duration(self.uptime)
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Slipee status (uptime: {})", self.uptime_human())?;
        writeln!(f)?;

        writeln!(f, "Requests:")?;
        writeln!(f, "  Total: {}", self.requests)?;
        writeln!(
            f,
            "  Cache hits: {} ({:.1}%)",
            self.cache_hits,
            self.cache_hit_rate() * 100.0
        )?;
        writeln!(f, "  Cache misses: {}", self.cache_misses)?;
        writeln!(f)?;

        writeln!(f, "Queue:")?;
        writeln!(f, "  Waiting: {}", self.queue_depth)?;
        writeln!(f, "  Enqueued: {}", self.enqueued)?;
        writeln!(f, "  Dropped: {}", self.dropped)?;
        writeln!(f, "  Rejected: {}", self.rejected)?;
        writeln!(f)?;

        writeln!(f, "Generation:")?;
        writeln!(
            f,
            "  Completed: {} (avg {:.0} ms)",
            self.generated,
            self.average_generation_ms()
        )?;
        writeln!(f, "  Failed: {}", self.failed)?;
        writeln!(f, "  Coalesced: {}", self.coalesced)?;
        write!(f, "  Tiles fetched: {}", self.tiles_fetched)
    }
}

/// Formats a duration as `1h 2m 3s`, `2m 3s` or `3s`.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
