//! Service error types.

use thiserror::Error;

use crate::cache::CacheError;
use crate::request::ValidationError;
use crate::stitch::StitchError;

/// Errors returned by [`StaticMapService`](super::StaticMapService).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request is outside the accepted ranges.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// A tile could not be fetched; nothing was cached.
    #[error(transparent)]
    Stitch(#[from] StitchError),

    /// The image could not be encoded or persisted.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The generation queue is at capacity.
    #[error("generation queue is full")]
    QueueFull,

    /// The generation worker is gone and nothing drains the queue.
    #[error("generation worker has stopped")]
    WorkerStopped,

    #[error("invalid service configuration: {0}")]
    Config(String),

    /// A blocking task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use crate::provider::ProviderError;

    #[test]
    fn test_messages() {
        assert_eq!(ServiceError::QueueFull.to_string(), "generation queue is full");

        let err: ServiceError = ValidationError::Zoom { value: 30, max: 23 }.into();
        assert_eq!(err.to_string(), "invalid request: zoom 30 is higher than 23");

        let err: ServiceError = StitchError::TileFetch {
            tile: TileCoord::new(1, 2, 3),
            source: ProviderError::NotFound {
                url: "http://t/3/1/2.png".to_string(),
            },
        }
        .into();
        assert_eq!(
            err.to_string(),
            "failed to fetch tile 3/1/2: tile not found at http://t/3/1/2.png"
        );
    }
}
