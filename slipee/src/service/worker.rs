//! Background generation worker.
//!
//! The single consumer of the generation queue. Requests are handled one at
//! a time in FIFO order, with a politeness delay after each so the tile
//! server never sees more than one map's worth of fetches at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::StaticMapService;
use crate::provider::TileSource;
use crate::request::MapRequest;

/// Drains the generation queue of a [`StaticMapService`].
pub struct GenerationWorker<S: TileSource> {
    service: Arc<StaticMapService<S>>,
    receiver: mpsc::Receiver<MapRequest>,
    delay: Duration,
}

impl<S: TileSource + 'static> GenerationWorker<S> {
    pub(crate) fn new(
        service: Arc<StaticMapService<S>>,
        receiver: mpsc::Receiver<MapRequest>,
        delay: Duration,
    ) -> Self {
        Self {
            service,
            receiver,
            delay,
        }
    }

    /// Runs until shutdown is signalled.
    ///
    /// A generation in progress always finishes; shutdown is only observed
    /// while waiting for the next request or during the delay. Failed
    /// requests are logged and dropped.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            delay_ms = self.delay.as_millis() as u64,
            "Generation worker starting"
        );

        loop {
            let request = tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Generation worker shutting down");
                    break;
                }

                // The worker keeps the service, and with it the only sender,
                // alive: the channel never closes, so only the token stops us.
                Some(request) = self.receiver.recv() => request,
            };

            self.service.metrics().dequeued();
            debug!(request = %request, "Generating queued map");

            match self.service.build(&request).await {
                Ok(path) => {
                    debug!(request = %request, path = %path.display(), "Queued map ready")
                }
                Err(e) => warn!(request = %request, error = %e, "Queued map dropped"),
            }

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Generation worker shutting down");
                    break;
                }

                _ = tokio::time::sleep(self.delay) => {}
            }
        }

        info!("Generation worker stopped");
    }
}
