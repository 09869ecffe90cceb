use std::{io, path::PathBuf};

use thiserror::Error;

use super::migrate::MigrationError;

/// Failures of the storage layer. A missing file is not one of them: missing files are replaced by
/// defaults.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file exists but can't be parsed. It is never regenerated, the user has to look at it.
    #[error("{} contains malformed content: {source}", .path.display())]
    MalformedContent {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} uses schema version {version}, this build understands up to {supported}", .path.display())]
    UnsupportedVersion {
        path: PathBuf,
        version: u64,
        supported: u32,
    },
    #[error("{} couldn't be migrated: {source}", .path.display())]
    Migration {
        path: PathBuf,
        #[source]
        source: MigrationError,
    },
    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    pub(super) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> StorageError {
        let path = path.into();
        move |source| StorageError::Io { path, source }
    }

    pub(super) fn malformed(path: impl Into<PathBuf>) -> impl FnOnce(serde_json::Error) -> StorageError {
        let path = path.into();
        move |source| StorageError::MalformedContent { path, source }
    }
}
