//! Content-addressed cache of rendered images
//!
//! A request's [`fingerprint`] is both its cache key and, through
//! [`relative_path`], its location under the cache root. Entries are written
//! once via temporary file and rename, and are never overwritten.

mod disk;
mod fingerprint;

pub use disk::{encode_png, CacheError, ImageCache};
pub use fingerprint::{fingerprint, relative_path, IMAGE_EXTENSION};
