//! Static map service
//!
//! Ties the stitcher, overlays and disk cache together behind three access
//! patterns, and serializes background generation through a single worker.
//!
//! ```text
//!                     ┌────────────────────────────────────────────┐
//!  stitch(req) ──────►│ cache hit? ── yes ──► Ready(path)          │
//!                     │     │ no                                   │
//!                     │     └─► try_send ──► Pending (full: drop)  │
//!  queue(req) ───────►│ cache hit? ── yes ──► Ok                   │
//!                     │     │ no                                   │
//!                     │     └─► try_send ──► Ok | QueueFull        │
//!  generate_now(req) ►│ lock(fp) ─► stitch ─► overlays ─► PNG ─►   │
//!                     │ temp file ─► rename ─► path                │
//!                     └──────────────────────┬─────────────────────┘
//!                                            │ bounded mpsc
//!                                            ▼
//!                     GenerationWorker: FIFO, one at a time,
//!                     politeness delay between requests
//! ```
//!
//! The service is constructed explicitly and shared through `Arc`; there is
//! no global instance.
//!
//! # Example
//!
//! ```ignore
//! use slipee::service::{ServiceConfig, StaticMapService};
//!
//! let (service, worker) = StaticMapService::new(config, source, overlays)?;
//! let shutdown = CancellationToken::new();
//! tokio::spawn(worker.run(shutdown.clone()));
//!
//! match service.stitch(request).await? {
//!     StitchOutcome::Ready(path) => serve(path),
//!     StitchOutcome::Pending => accepted(),
//! }
//! ```

mod config;
mod error;
mod locks;
mod worker;

pub use config::{ServiceConfig, DEFAULT_POLITENESS_DELAY, DEFAULT_QUEUE_CAPACITY};
pub use error::ServiceError;
pub use locks::{GenerationGuard, GenerationLocks};
pub use worker::GenerationWorker;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::{encode_png, fingerprint, ImageCache};
use crate::overlay::{Overlay, OverlayFactory};
use crate::provider::TileSource;
use crate::request::{MapRequest, RequestLimits};
use crate::stitch::Stitcher;
use crate::telemetry::ServiceMetrics;

/// Result of [`StaticMapService::stitch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StitchOutcome {
    /// The image is cached at this path.
    Ready(PathBuf),
    /// Not cached yet; generation was queued if there was room.
    Pending,
}

impl StitchOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            StitchOutcome::Ready(path) => Some(path),
            StitchOutcome::Pending => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, StitchOutcome::Ready(_))
    }
}

/// How a build request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildKind {
    Built { tiles: usize },
    /// Another build of the same fingerprint finished while waiting.
    Coalesced,
}

/// Renders, caches and queues static map images.
pub struct StaticMapService<S: TileSource> {
    stitcher: Stitcher<S>,
    cache: ImageCache,
    overlays: OverlayFactory,
    limits: RequestLimits,
    locks: GenerationLocks,
    metrics: Arc<ServiceMetrics>,
    queue: mpsc::Sender<MapRequest>,
    queue_capacity: usize,
}

impl<S: TileSource + 'static> StaticMapService<S> {
    /// Creates the service and the worker that drains its queue.
    ///
    /// The worker does nothing until [`GenerationWorker::run`] is spawned.
    /// Dropping it makes `queue` fail with [`ServiceError::WorkerStopped`].
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if the queue capacity is zero.
    pub fn new(
        config: ServiceConfig,
        source: S,
        overlays: OverlayFactory,
    ) -> Result<(Arc<Self>, GenerationWorker<S>), ServiceError> {
        Self::with_metrics(config, source, overlays, Arc::new(ServiceMetrics::new()))
    }

    /// Creates the service with externally owned metrics.
    pub fn with_metrics(
        config: ServiceConfig,
        source: S,
        overlays: OverlayFactory,
        metrics: Arc<ServiceMetrics>,
    ) -> Result<(Arc<Self>, GenerationWorker<S>), ServiceError> {
        if config.queue_capacity() == 0 {
            return Err(ServiceError::Config(
                "queue capacity must be at least 1".to_string(),
            ));
        }

        let (queue, receiver) = mpsc::channel(config.queue_capacity());

        let service = Arc::new(Self {
            stitcher: Stitcher::new(source),
            cache: ImageCache::new(config.cache_root().clone()),
            overlays,
            limits: config.limits(),
            locks: GenerationLocks::new(),
            metrics,
            queue,
            queue_capacity: config.queue_capacity(),
        });

        info!(
            cache = %config.cache_root().display(),
            source = service.stitcher.source().name(),
            queue_capacity = config.queue_capacity(),
            delay_ms = config.politeness_delay().as_millis() as u64,
            "Static map service created"
        );

        let worker = GenerationWorker::new(
            Arc::clone(&service),
            receiver,
            config.politeness_delay(),
        );

        Ok((service, worker))
    }

    /// Returns the cached path, or queues generation and reports pending.
    ///
    /// Best-effort: a full queue drops the request (counted in the
    /// `dropped` metric) and still reports [`StitchOutcome::Pending`].
    ///
    /// # Errors
    ///
    /// Only [`ServiceError::Validation`].
    pub async fn stitch(&self, request: MapRequest) -> Result<StitchOutcome, ServiceError> {
        self.metrics.request_received();
        request.validate(&self.limits)?;

        if let Some(path) = self.lookup(&request).await {
            return Ok(StitchOutcome::Ready(path));
        }

        if let Err(e) = self.try_enqueue(request) {
            self.metrics.dropped();
            debug!(error = %e, "Request dropped");
        }
        Ok(StitchOutcome::Pending)
    }

    /// Queues generation unless the image is already cached.
    ///
    /// Never waits for queue space.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Validation`], [`ServiceError::QueueFull`] when the
    /// queue is at capacity, or [`ServiceError::WorkerStopped`].
    pub async fn queue(&self, request: MapRequest) -> Result<(), ServiceError> {
        self.metrics.request_received();
        request.validate(&self.limits)?;

        if self.lookup(&request).await.is_some() {
            return Ok(());
        }

        self.try_enqueue(request).inspect_err(|e| {
            if matches!(e, ServiceError::QueueFull) {
                self.metrics.rejected();
            }
        })
    }

    /// Generates the image now and returns its cache path.
    ///
    /// Returns immediately if the image is already cached. Runs alongside
    /// the worker; the per-fingerprint lock keeps concurrent builds of the
    /// same request down to one.
    pub async fn generate_now(&self, request: &MapRequest) -> Result<PathBuf, ServiceError> {
        self.metrics.request_received();
        request.validate(&self.limits)?;

        if let Some(path) = self.lookup(request).await {
            return Ok(path);
        }

        self.build(request).await
    }

    /// Like [`generate_now`](Self::generate_now), but the build runs on a
    /// task of its own.
    ///
    /// Dropping the returned future does not stop the build: the map is
    /// still cached and counted. Request handlers use this so a client
    /// hanging up never abandons a started generation.
    pub async fn generate_detached(
        self: &Arc<Self>,
        request: MapRequest,
    ) -> Result<PathBuf, ServiceError> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.generate_now(&request).await })
            .await
            .map_err(|e| ServiceError::Internal(format!("generation task failed: {}", e)))?
    }

    /// Builds and caches the image under the fingerprint lock.
    ///
    /// Used by the worker, whose requests were validated when queued.
    pub(crate) async fn build(&self, request: &MapRequest) -> Result<PathBuf, ServiceError> {
        let fp = fingerprint(request);
        let path = self.cache.path_for_fingerprint(&fp);
        let start = Instant::now();

        match self.build_locked(request, &fp, &path).await {
            Ok(BuildKind::Built { tiles }) => {
                let duration = start.elapsed();
                self.metrics.generation_completed(tiles, duration);
                info!(
                    fingerprint = %fp,
                    request = %request,
                    tiles = tiles,
                    duration_ms = duration.as_millis() as u64,
                    "Map generated"
                );
                Ok(path)
            }
            Ok(BuildKind::Coalesced) => {
                self.metrics.generation_coalesced();
                debug!(fingerprint = %fp, "Map built by a concurrent request");
                Ok(path)
            }
            Err(e) => {
                self.metrics.generation_failed();
                warn!(fingerprint = %fp, request = %request, error = %e, "Map generation failed");
                Err(e)
            }
        }
    }

    async fn build_locked(
        &self,
        request: &MapRequest,
        fp: &str,
        path: &Path,
    ) -> Result<BuildKind, ServiceError> {
        let _guard = self.locks.acquire(fp).await;

        if self.cache.exists(request).await {
            return Ok(BuildKind::Coalesced);
        }

        let stitched = self.stitcher.stitch(request).await?;
        let tiles = stitched.tiles_fetched;

        let overlays = self.overlays.build(request);
        let mut image = stitched.image;
        let target = path.to_path_buf();
        let data = tokio::task::spawn_blocking(move || {
            overlays.apply(&mut image);
            encode_png(&image, &target)
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("encode task failed: {}", e)))??;

        self.cache.write_atomic(path, &data).await?;

        Ok(BuildKind::Built { tiles })
    }

    async fn lookup(&self, request: &MapRequest) -> Option<PathBuf> {
        match self.cache.lookup(request).await {
            Some(path) => {
                self.metrics.cache_hit();
                Some(path)
            }
            None => {
                self.metrics.cache_miss();
                None
            }
        }
    }

    fn try_enqueue(&self, request: MapRequest) -> Result<(), ServiceError> {
        self.metrics.queue_reserved();
        match self.queue.try_send(request) {
            Ok(()) => {
                self.metrics.enqueued();
                Ok(())
            }
            Err(e) => {
                self.metrics.queue_released();
                match e {
                    mpsc::error::TrySendError::Full(_) => Err(ServiceError::QueueFull),
                    mpsc::error::TrySendError::Closed(_) => Err(ServiceError::WorkerStopped),
                }
            }
        }
    }
}

impl<S: TileSource> StaticMapService<S> {
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    pub fn metrics(&self) -> &Arc<ServiceMetrics> {
        &self.metrics
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn source(&self) -> &S {
        self.stitcher.source()
    }
}
