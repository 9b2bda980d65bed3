//! Point-in-time capture of a directory tree

use ahash::AHashMap;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::trace;
use walkdir::WalkDir;

/// Failure to capture a snapshot
///
/// Only the initial lookup of the root can produce this; errors on individual
/// entries during the walk are dropped.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to stat {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SnapshotError {
    /// Path whose lookup failed
    pub fn path(&self) -> &Path {
        match self {
            SnapshotError::Io { path, .. } => path,
        }
    }

    /// Kind of the underlying I/O error
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            SnapshotError::Io { source, .. } => source.kind(),
        }
    }
}

/// Metadata of one filesystem entry as observed during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    name: String,
    path: PathBuf,
    modified: Option<SystemTime>,
    mode: u32,
    is_dir: bool,
}

impl EntryMeta {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        modified: Option<SystemTime>,
        mode: u32,
        is_dir: bool,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            modified,
            mode,
            is_dir,
        }
    }

    /// Build from lstat-style metadata
    pub fn from_metadata(path: &Path, meta: &Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Self {
            name,
            path: path.to_path_buf(),
            // Not every platform records mtime
            modified: meta.modified().ok(),
            mode: mode_bits(meta),
            is_dir: meta.is_dir(),
        }
    }

    /// Base name of the entry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path as visited by the walk
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Permission and file-type bits
    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

#[cfg(unix)]
fn mode_bits(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn mode_bits(meta: &Metadata) -> u32 {
    // Approximate st_mode from what the platform exposes
    let perm = if meta.permissions().readonly() { 0o444 } else { 0o666 };
    let kind = if meta.is_dir() {
        0o040000
    } else if meta.file_type().is_symlink() {
        0o120000
    } else {
        0o100000
    };
    kind | perm
}

/// Mapping from entry key to metadata for everything under a root
///
/// Keys are paths relative to the root, so `a/x` and `b/x` are distinct
/// entries. When the root is a directory the root itself is not recorded;
/// when it is a single file, that file is the only entry, keyed by its name.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    root: PathBuf,
    entries: AHashMap<PathBuf, EntryMeta>,
}

impl Snapshot {
    /// Capture the current state of `root` and everything beneath it
    pub fn take(root: &Path) -> Result<Self, SnapshotError> {
        let root_meta = std::fs::symlink_metadata(root).map_err(|source| SnapshotError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let mut entries = AHashMap::new();

        if !root_meta.is_dir() {
            let meta = EntryMeta::from_metadata(root, &root_meta);
            entries.insert(PathBuf::from(meta.name()), meta);
            return Ok(Self {
                root: root.to_path_buf(),
                entries,
            });
        }

        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    trace!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    trace!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            let key = match entry.path().strip_prefix(root) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => continue,
            };

            entries.insert(key, EntryMeta::from_metadata(entry.path(), &meta));
        }

        Ok(Self {
            root: root.to_path_buf(),
            entries,
        })
    }

    /// Build a snapshot from explicit `(key, meta)` pairs
    pub fn from_entries<I, K>(root: impl Into<PathBuf>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, EntryMeta)>,
        K: Into<PathBuf>,
    {
        Self {
            root: root.into(),
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Root this snapshot was taken from
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, key: &Path) -> Option<&EntryMeta> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over `(key, meta)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &EntryMeta)> {
        self.entries.iter().map(|(k, v)| (k.as_path(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
