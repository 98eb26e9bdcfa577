//! CLI command implementations.
//!
//! - [`serve`] - HTTP server and background worker
//! - [`render`] - Synchronous generation of one map
//! - [`fingerprint`] - Cache key and path of a map

pub mod common;
pub mod fingerprint;
pub mod render;
pub mod serve;
