//! Error types for the output module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving a transcript.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The transcript cannot be expressed in the requested format.
    #[error("Cannot create {format}: {reason}")]
    SerializationFailed { format: String, reason: String },

    /// Writing the output file failed.
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
