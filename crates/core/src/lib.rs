//! Snapshot and diff primitives for Pollwatch
//!
//! This crate provides:
//! - Point-in-time snapshots of a directory tree (mtime + mode per entry)
//! - The change vocabulary (`Op` bitset, `Event`)
//! - The snapshot diff that turns two snapshots into typed events
//!
//! Everything here is synchronous and free of shared state; scheduling lives
//! in the `watcher` crate.

pub mod diff;
pub mod event;
pub mod snapshot;

// Re-exports
pub use diff::diff;
pub use event::{Event, Op};
pub use snapshot::{EntryMeta, Snapshot, SnapshotError};
