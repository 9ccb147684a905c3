//! Directory scanning.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::error::CatalogError;
use super::types::{MediaFile, MediaKind};

/// Discovers supported media files in a directory.
pub struct MediaCatalog;

impl MediaCatalog {
    /// Scans `directory` for audio and video files.
    ///
    /// Results are sorted by path. An empty vector means there is nothing to
    /// do; deciding whether that is fatal is up to the caller.
    pub fn scan(directory: &Path, recursive: bool) -> Result<Vec<MediaFile>, CatalogError> {
        if !directory.exists() {
            return Err(CatalogError::DirectoryNotFound {
                path: directory.to_path_buf(),
            });
        }
        if !directory.is_dir() {
            return Err(CatalogError::NotADirectory {
                path: directory.to_path_buf(),
            });
        }

        let root = directory
            .canonicalize()
            .map_err(|source| CatalogError::Io {
                path: directory.to_path_buf(),
                source,
            })?;

        let mut files = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(source) if dir == root => {
                    return Err(CatalogError::Io { path: dir, source });
                }
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                    continue;
                }
            };

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                        continue;
                    }
                };
                let path = entry.path();
                let is_symlink = entry.file_type().map(|t| t.is_symlink()).unwrap_or(false);
                // Follows symlinks, so a link to a media file counts as that file.
                let metadata = match std::fs::metadata(&path) {
                    Ok(m) => m,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                        continue;
                    }
                };

                if metadata.is_dir() {
                    // Linked directories are never entered; a link back to an
                    // ancestor would otherwise yield every file once per level.
                    if is_symlink {
                        debug!(path = %path.display(), "Not following directory symlink");
                    } else if recursive {
                        pending.push(path);
                    }
                } else if metadata.is_file() {
                    if let Some(kind) = MediaKind::from_path(&path) {
                        files.push(MediaFile {
                            path,
                            size_bytes: metadata.len(),
                            kind,
                        });
                    }
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));

        debug!(
            directory = %root.display(),
            recursive,
            found = files.len(),
            "Media scan complete"
        );

        Ok(files)
    }

    /// Paths of the files found by [`MediaCatalog::scan`].
    pub fn scan_paths(directory: &Path, recursive: bool) -> Result<Vec<PathBuf>, CatalogError> {
        Ok(Self::scan(directory, recursive)?
            .into_iter()
            .map(|f| f.path)
            .collect())
    }
}
