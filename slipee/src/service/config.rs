//! Service configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::request::RequestLimits;

/// Default number of requests the generation queue holds.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default pause between two generations on the worker.
pub const DEFAULT_POLITENESS_DELAY: Duration = Duration::from_secs(1);

/// Runtime settings of a [`StaticMapService`](super::StaticMapService).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use slipee::service::ServiceConfig;
///
/// let config = ServiceConfig::new("/var/cache/slipee")
///     .with_queue_capacity(16)
///     .with_politeness_delay(Duration::from_millis(500));
/// assert_eq!(config.queue_capacity(), 16);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    cache_root: PathBuf,
    queue_capacity: usize,
    politeness_delay: Duration,
    limits: RequestLimits,
}

impl ServiceConfig {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            politeness_delay: DEFAULT_POLITENESS_DELAY,
            limits: RequestLimits::default(),
        }
    }

    /// Sets the queue capacity. Must be at least 1.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_politeness_delay(mut self, delay: Duration) -> Self {
        self.politeness_delay = delay;
        self
    }

    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn cache_root(&self) -> &PathBuf {
        &self.cache_root
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn politeness_delay(&self) -> Duration {
        self.politeness_delay
    }

    pub fn limits(&self) -> RequestLimits {
        self.limits
    }
}
