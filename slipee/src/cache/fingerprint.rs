//! Request fingerprints and their on-disk paths.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::request::MapRequest;

/// File extension of cached images.
pub const IMAGE_EXTENSION: &str = "png";

/// Computes the lowercase hex SHA-256 fingerprint of a request.
///
/// The digest covers, in order: width, height and zoom as little-endian
/// `u32`, latitude and longitude as little-endian `f64`, then the raw label
/// bytes.
///
/// # Example
///
/// ```
/// use slipee::cache::fingerprint;
/// use slipee::request::MapRequest;
///
/// let a = fingerprint(&MapRequest::new(400, 300, 12, 59.91, 10.75, ""));
/// let b = fingerprint(&MapRequest::new(400, 300, 12, 59.91, 10.75, ""));
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn fingerprint(request: &MapRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.width().to_le_bytes());
    hasher.update(request.height().to_le_bytes());
    hasher.update((request.zoom() as u32).to_le_bytes());
    hasher.update(request.latitude().to_le_bytes());
    hasher.update(request.longitude().to_le_bytes());
    hasher.update(request.label().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sharded path of a fingerprint relative to the cache root.
///
/// The first two hex characters name the directory and the rest the file:
/// `ab/cdef….png`.
pub fn relative_path(fingerprint: &str) -> PathBuf {
    let split = fingerprint.len().min(2);
    let (shard, rest) = fingerprint.split_at(split);
    PathBuf::from(shard).join(format!("{}.{}", rest, IMAGE_EXTENSION))
}
