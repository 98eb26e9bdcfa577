//! Content-addressed image cache on disk.
//!
//! Finished images live at `<root>/<shard>/<rest>.png`, where the shard is
//! the first two hex characters of the request fingerprint. Presence of the
//! file is the only notion of a cache hit: there is no index, no expiry and
//! no eviction.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;
use tracing::{debug, trace};

use super::fingerprint::{fingerprint, relative_path};
use crate::request::MapRequest;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errors while persisting a cache entry.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {path} into place: {source}")]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode image for {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}

/// Disk cache of finished map images.
#[derive(Debug, Clone)]
pub struct ImageCache {
    root: PathBuf,
}

impl ImageCache {
    /// Creates a cache rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the entry for a fingerprint.
    pub fn path_for_fingerprint(&self, fingerprint: &str) -> PathBuf {
        self.root.join(relative_path(fingerprint))
    }

    /// Absolute path of the entry for a request.
    pub fn path_for(&self, request: &MapRequest) -> PathBuf {
        self.path_for_fingerprint(&fingerprint(request))
    }

    /// Returns true if a regular file exists at the request's path.
    pub async fn exists(&self, request: &MapRequest) -> bool {
        is_entry(&self.path_for(request)).await
    }

    /// Returns the path if the entry exists.
    pub async fn lookup(&self, request: &MapRequest) -> Option<PathBuf> {
        let path = self.path_for(request);
        is_entry(&path).await.then_some(path)
    }

    /// Writes `data` to `path` through a temporary file in the same
    /// directory, so readers never observe a partial file.
    pub async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CacheError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let temp_path = temp_path_for(path);
        trace!(path = %temp_path.display(), bytes = data.len(), "Writing temporary file");

        if let Err(source) = tokio::fs::write(&temp_path, data).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(CacheError::Write {
                path: temp_path,
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(CacheError::Rename {
                path: path.to_path_buf(),
                source,
            });
        }

        debug!(path = %path.display(), bytes = data.len(), "Cache entry written");
        Ok(())
    }
}

/// Encodes an image as PNG, favoring speed over size.
///
/// `path` only labels the error.
pub fn encode_png(image: &RgbaImage, path: &Path) -> Result<Vec<u8>, CacheError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(CacheError::Encode {
            path: path.to_path_buf(),
            reason: format!("cannot encode an empty {}×{} canvas", width, height),
        });
    }

    let mut buffer = Vec::new();
    PngEncoder::new_with_quality(&mut buffer, CompressionType::Fast, FilterType::Adaptive)
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| CacheError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(buffer)
}

async fn is_entry(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Unique hidden sibling of `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let unique = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), unique))
}
