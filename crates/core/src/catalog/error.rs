//! Error types for the catalog module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering media files.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The directory to scan does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// The path exists but is not a directory.
    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// I/O error while reading the directory.
    #[error("Failed to read directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
