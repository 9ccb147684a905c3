//! Media catalog for discovering transcribable files.
//!
//! Scans a directory (optionally recursively) and returns the audio and video
//! files it recognizes, sorted by path so batch ordering is reproducible.
//!
//! # Example
//!
//! ```ignore
//! use transcribe_core::catalog::MediaCatalog;
//!
//! let files = MediaCatalog::scan(Path::new("/recordings"), true)?;
//! for file in &files {
//!     println!("{} ({} bytes, {:?})", file.path.display(), file.size_bytes, file.kind);
//! }
//! ```

mod error;
mod scanner;
mod types;

pub use error::CatalogError;
pub use scanner::MediaCatalog;
pub use types::{
    is_audio, is_supported, is_video, supported_extensions, MediaFile, MediaKind,
    AUDIO_EXTENSIONS, VIDEO_EXTENSIONS,
};
