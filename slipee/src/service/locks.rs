//! Per-fingerprint generation locks.
//!
//! At most one build of a given fingerprint runs at a time, across the
//! synchronous path and the worker. A caller that waited on the lock
//! re-checks the cache before building, so it normally finds the finished
//! file and does no work.
//!
//! ```text
//! generate_now(A) ─┐
//!                  ├──► GenerationLocks[fp(A)] ──► one build, others re-check cache
//! worker(A) ───────┘
//! ```
//!
//! Entries are removed when the last holder or waiter lets go, so the map
//! only ever holds fingerprints that are being built.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Map of in-flight fingerprints to their lock.
#[derive(Default)]
pub struct GenerationLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl GenerationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no one else is building `fingerprint` and takes the lock.
    pub async fn acquire(&self, fingerprint: &str) -> GenerationGuard<'_> {
        // The shard lock is released at the end of this statement
        let lock = Arc::clone(
            self.locks
                .entry(fingerprint.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );

        let guard = lock.lock_owned().await;
        trace!(fingerprint = fingerprint, "Generation lock acquired");

        GenerationGuard {
            locks: self,
            fingerprint: fingerprint.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of fingerprints currently locked or waited on.
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }
}

/// Holds a fingerprint's lock until dropped.
pub struct GenerationGuard<'a> {
    locks: &'a GenerationLocks,
    fingerprint: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        // Release first so the map's handle is the only one left if no one waits
        drop(self.guard.take());
        self.locks
            .locks
            .remove_if(&self.fingerprint, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_entry_removed_after_release() {
        let locks = GenerationLocks::new();
        {
            let _guard = locks.acquire("abc").await;
            assert_eq!(locks.in_flight(), 1);
        }
        assert_eq!(locks.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_different_fingerprints_do_not_block() {
        let locks = GenerationLocks::new();
        let _a = locks.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.in_flight(), 2);
    }

    #[tokio::test]
    async fn test_same_fingerprint_waits() {
        let locks = GenerationLocks::new();
        let guard = locks.acquire("a").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire("a")).await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired = tokio::time::timeout(Duration::from_millis(100), locks.acquire("a")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_at_most_one_holder() {
        let locks = Arc::new(GenerationLocks::new());
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let active = Arc::clone(&active);
                let max_seen = Arc::clone(&max_seen);
                tokio::spawn(async move {
                    let _guard = locks.acquire("same").await;
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.in_flight(), 0);
    }
}
