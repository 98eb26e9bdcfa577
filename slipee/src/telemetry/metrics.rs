//! Lock-free atomic metrics collection.
//!
//! All counters use `Relaxed` ordering; they are independent measurements
//! and nothing synchronizes through them.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::MetricsSnapshot;

/// Counters for the static map service.
pub struct ServiceMetrics {
    start_time: Instant,

    // === Requests ===
    /// Requests seen by `stitch`, `queue` and `generate_now`
    requests: AtomicU64,
    /// Requests answered straight from the cache
    cache_hits: AtomicU64,
    /// Requests that missed the cache
    cache_misses: AtomicU64,

    // === Queue ===
    /// Requests accepted by the queue
    enqueued: AtomicU64,
    /// Requests `stitch` could not queue and silently dropped
    dropped: AtomicU64,
    /// Requests `queue` refused with a queue-full error
    rejected: AtomicU64,
    /// Requests waiting in the queue
    queue_depth: AtomicUsize,

    // === Generation ===
    generated: AtomicU64,
    failed: AtomicU64,
    /// Builds skipped because another build of the same fingerprint finished first
    coalesced: AtomicU64,
    tiles_fetched: AtomicU64,
    /// Total generation time in microseconds
    generation_time_us: AtomicU64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            enqueued: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            queue_depth: AtomicUsize::new(0),
            generated: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            tiles_fetched: AtomicU64::new(0),
            generation_time_us: AtomicU64::new(0),
        }
    }

    // === Request tracking ===

    pub fn request_received(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    // === Queue tracking ===

    /// Reserve a place in the queue depth before a request is sent.
    ///
    /// Must come before the send: the worker may take the request and call
    /// [`dequeued`](Self::dequeued) before the sender returns.
    pub fn queue_reserved(&self) {
        self.queue_depth.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request entering the queue. Its place is already reserved.
    pub fn enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Give back a reservation whose send failed.
    pub fn queue_released(&self) {
        self.decrement_depth();
    }

    /// Record the worker taking a request off the queue.
    pub fn dequeued(&self) {
        self.decrement_depth();
    }

    fn decrement_depth(&self) {
        let _ = self
            .queue_depth
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |depth| {
                Some(depth.saturating_sub(1))
            });
    }

    pub fn dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    // === Generation tracking ===

    /// Record a finished generation.
    pub fn generation_completed(&self, tiles: usize, duration: Duration) {
        self.generated.fetch_add(1, Ordering::Relaxed);
        self.tiles_fetched.fetch_add(tiles as u64, Ordering::Relaxed);
        self.generation_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn generation_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn generation_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    // === Snapshot ===

    /// Takes a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            queue_depth: self.queue_depth.load(Ordering::Relaxed),
            generated: self.generated.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            tiles_fetched: self.tiles_fetched.load(Ordering::Relaxed),
            total_generation_time_ms: self.generation_time_us.load(Ordering::Relaxed) / 1000,
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_metrics_are_zero() {
        let snapshot = ServiceMetrics::new().snapshot();
        assert_eq!(snapshot.requests, 0);
        assert_eq!(snapshot.generated, 0);
        assert_eq!(snapshot.queue_depth, 0);
    }

    #[test]
    fn test_queue_depth_tracks_enqueue_and_dequeue() {
        let metrics = ServiceMetrics::new();
        for _ in 0..2 {
            metrics.queue_reserved();
            metrics.enqueued();
        }
        metrics.dequeued();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.enqueued, 2);
        assert_eq!(snapshot.queue_depth, 1);
    }

    #[test]
    fn test_dequeue_before_send_returns_keeps_depth_exact() {
        let metrics = ServiceMetrics::new();
        metrics.queue_reserved();
        // Worker wins the race against the sender
        metrics.dequeued();
        metrics.enqueued();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.enqueued, 1);
        assert_eq!(snapshot.queue_depth, 0);
    }

    #[test]
    fn test_released_reservation_is_not_counted() {
        let metrics = ServiceMetrics::new();
        metrics.queue_reserved();
        metrics.queue_released();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.enqueued, 0);
        assert_eq!(snapshot.queue_depth, 0);
    }

    #[test]
    fn test_queue_depth_never_underflows() {
        let metrics = ServiceMetrics::new();
        metrics.dequeued();
        assert_eq!(metrics.snapshot().queue_depth, 0);
    }

    #[test]
    fn test_generation_completed() {
        let metrics = ServiceMetrics::new();
        metrics.generation_completed(6, Duration::from_millis(250));
        metrics.generation_completed(4, Duration::from_millis(750));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.generated, 2);
        assert_eq!(snapshot.tiles_fetched, 10);
        assert_eq!(snapshot.total_generation_time_ms, 1000);
    }

    #[test]
    fn test_concurrent_updates() {
        let metrics = Arc::new(ServiceMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.request_received();
                        metrics.cache_hit();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests, 8000);
        assert_eq!(snapshot.cache_hits, 8000);
    }
}
