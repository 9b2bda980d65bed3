//! Polling file system watcher for Pollwatch
//!
//! This crate provides change detection without native OS notifications:
//! - Fixed-interval re-scanning of registered roots
//! - Snapshot diffing into CREATE / WRITE / REMOVE / CHMOD events
//! - Blocking delivery over channels (the consumer paces the poller)
//! - TOML configuration for the interval and optional channel buffering
//!
//! ```no_run
//! use watcher::PollWatcher;
//!
//! let watcher = PollWatcher::new()?;
//! watcher.add("/tmp/w")?;
//!
//! for event in watcher.events() {
//!     println!("{}", event);
//! }
//! # Ok::<(), watcher::WatchError>(())
//! ```

pub mod config;
pub mod error;
pub mod poll;

// Re-exports
pub use config::{WatcherConfig, DEFAULT_POLL_INTERVAL};
pub use error::{Result, WatchError};
pub use poll::PollWatcher;
pub use pollwatch_core::{Event, Op, SnapshotError};
