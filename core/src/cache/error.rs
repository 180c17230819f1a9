//! Error types for cache storage operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors while setting up the on-disk store
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
