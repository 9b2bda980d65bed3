//! Errors returned by the watcher API

use pollwatch_core::SnapshotError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("path cannot be empty")]
    EmptyPath,

    #[error("watch already exists: {}", .0.display())]
    AlreadyWatched(PathBuf),

    #[error("watcher has been closed")]
    Stopped,

    #[error("poll interval must be greater than zero")]
    InvalidInterval,

    /// Baseline snapshot failed while adding a watch
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("failed to spawn polling thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Result type for watcher operations
pub type Result<T> = std::result::Result<T, WatchError>;
