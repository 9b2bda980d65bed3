//! Polling scheduler
//!
//! A single background thread wakes on a fixed interval, re-snapshots every
//! registered root in turn, diffs against the stored baseline, and hands each
//! event to the consumer. Sends block until the consumer receives (or until
//! the configured buffer has room), so a consumer that stops draining stalls
//! polling instead of losing events.

use crate::config::WatcherConfig;
use crate::error::{Result, WatchError};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use parking_lot::Mutex;
use pollwatch_core::{diff, Event, Snapshot, SnapshotError};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// One registered root and its latest baseline
struct Target {
    snapshot: Arc<Snapshot>,
    /// Distinguishes a re-added root from the one a tick started with
    generation: u64,
}

/// State shared between the API and the polling thread
struct Shared {
    targets: Mutex<HashMap<PathBuf, Target>>,
    next_generation: AtomicU64,
    running: AtomicBool,
}

struct Worker {
    /// Dropped to signal shutdown
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

/// Polling file watcher
///
/// Starts polling as soon as it is constructed. Events arrive on
/// [`events`](Self::events), re-scan failures on [`errors`](Self::errors).
/// Both channels disconnect once [`close`](Self::close) returns.
pub struct PollWatcher {
    shared: Arc<Shared>,
    /// Interval for the next timer start; the armed timer is unaffected
    poll_interval: Mutex<Duration>,
    worker: Mutex<Option<Worker>>,
    events: Receiver<Event>,
    errors: Receiver<SnapshotError>,
}

impl PollWatcher {
    /// Create a watcher polling every 250ms with unbuffered channels
    pub fn new() -> Result<Self> {
        Self::with_config(WatcherConfig::default())
    }

    pub fn with_config(config: WatcherConfig) -> Result<Self> {
        config.validate()?;

        let (event_tx, events) = bounded(config.event_buffer);
        let (error_tx, errors) = bounded(config.error_buffer);

        let shared = Arc::new(Shared {
            targets: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
            running: AtomicBool::new(true),
        });

        let interval = config.poll_interval();
        let worker = Poller::spawn(Arc::clone(&shared), interval, event_tx, error_tx)?;

        info!("Started polling watcher (interval: {:?})", interval);

        Ok(Self {
            shared,
            poll_interval: Mutex::new(interval),
            worker: Mutex::new(Some(worker)),
            events,
            errors,
        })
    }

    /// Watch `path` and everything beneath it
    ///
    /// The baseline snapshot is taken before this returns, so only changes
    /// made afterwards are reported.
    pub fn add(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(WatchError::EmptyPath);
        }
        self.ensure_running()?;

        if self.shared.targets.lock().contains_key(path) {
            return Err(WatchError::AlreadyWatched(path.to_path_buf()));
        }

        // Walk without holding the lock
        let snapshot = Snapshot::take(path)?;
        self.insert_target(path, snapshot)
    }

    /// Register a baseline taken by `add`
    ///
    /// `close` may have run during the walk, so the running flag is checked
    /// again under the lock.
    fn insert_target(&self, path: &Path, snapshot: Snapshot) -> Result<()> {
        let entries = snapshot.len();
        let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);

        let mut targets = self.shared.targets.lock();
        if !self.is_running() {
            return Err(WatchError::Stopped);
        }

        match targets.entry(path.to_path_buf()) {
            Entry::Occupied(_) => Err(WatchError::AlreadyWatched(path.to_path_buf())),
            Entry::Vacant(slot) => {
                slot.insert(Target {
                    snapshot: Arc::new(snapshot),
                    generation,
                });
                debug!("Watching {} ({} entries)", path.display(), entries);
                Ok(())
            }
        }
    }

    /// Stop watching `path`. Unknown paths are ignored.
    pub fn remove(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(WatchError::EmptyPath);
        }
        self.ensure_running()?;

        if self.shared.targets.lock().remove(path).is_some() {
            debug!("Stopped watching {}", path.display());
        }

        Ok(())
    }

    /// Set the poll interval
    ///
    /// Only takes effect when a timer is next started; the timer armed at
    /// construction keeps its original interval. Use
    /// [`with_config`](Self::with_config) to poll at a different rate.
    pub fn set_poll_frequency(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(WatchError::InvalidInterval);
        }
        *self.poll_interval.lock() = interval;
        Ok(())
    }

    pub fn poll_frequency(&self) -> Duration {
        *self.poll_interval.lock()
    }

    /// Stop polling and disconnect both channels
    ///
    /// Calling this more than once is a no-op.
    pub fn close(&self) {
        let worker = match self.worker.lock().take() {
            Some(worker) => worker,
            None => return,
        };

        self.shared.running.store(false, Ordering::SeqCst);
        drop(worker.shutdown);

        if worker.handle.join().is_err() {
            warn!("Polling thread panicked");
        }

        self.shared.targets.lock().clear();
        info!("Polling watcher closed");
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Receiving end of the event channel
    pub fn events(&self) -> Receiver<Event> {
        self.events.clone()
    }

    /// Receiving end of the re-scan error channel
    pub fn errors(&self) -> Receiver<SnapshotError> {
        self.errors.clone()
    }

    /// Registered roots, sorted
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.shared.targets.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(WatchError::Stopped)
        }
    }
}

impl Drop for PollWatcher {
    fn drop(&mut self) {
        self.close();
    }
}

/// Shutdown was requested or the consumer side is gone
struct Halt;

/// Body of the polling thread. Owns the only senders.
struct Poller {
    shared: Arc<Shared>,
    events: Sender<Event>,
    errors: Sender<SnapshotError>,
    shutdown: Receiver<()>,
}

impl Poller {
    fn spawn(
        shared: Arc<Shared>,
        interval: Duration,
        events: Sender<Event>,
        errors: Sender<SnapshotError>,
    ) -> Result<Worker> {
        let (shutdown, shutdown_rx) = bounded(0);
        let poller = Poller {
            shared,
            events,
            errors,
            shutdown: shutdown_rx,
        };

        let handle = thread::Builder::new()
            .name("pollwatch".to_string())
            .spawn(move || poller.run(interval))
            .map_err(WatchError::Spawn)?;

        Ok(Worker { shutdown, handle })
    }

    fn run(self, interval: Duration) {
        let ticker = tick(interval);

        loop {
            select! {
                recv(self.shutdown) -> _ => break,
                recv(ticker) -> _ => {
                    if self.poll_once().is_err() {
                        break;
                    }
                }
            }
        }

        debug!("Polling thread exiting");
    }

    /// One tick across every target, sequentially
    fn poll_once(&self) -> std::result::Result<(), Halt> {
        let targets: Vec<(PathBuf, Arc<Snapshot>, u64)> = self
            .shared
            .targets
            .lock()
            .iter()
            .map(|(path, t)| (path.clone(), Arc::clone(&t.snapshot), t.generation))
            .collect();

        debug!("Polling {} watches", targets.len());

        for (root, old, generation) in targets {
            if !self.shared.running.load(Ordering::SeqCst) {
                return Err(Halt);
            }

            let new = match Snapshot::take(&root) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    // Keep the old baseline; next tick retries from it
                    warn!("Failed to rescan {}: {}", root.display(), e);
                    self.deliver(&self.errors, e)?;
                    continue;
                }
            };

            let events = diff(&old, &new);
            if !events.is_empty() {
                debug!("{} changes under {}", events.len(), root.display());
            }
            for event in events {
                self.deliver(&self.events, event)?;
            }

            // Skip if removed (or removed and re-added) during the scan
            if let Some(target) = self.shared.targets.lock().get_mut(&root) {
                if target.generation == generation {
                    target.snapshot = Arc::new(new);
                }
            }
        }

        Ok(())
    }

    /// Block until `item` is received or shutdown is requested
    fn deliver<T>(&self, tx: &Sender<T>, item: T) -> std::result::Result<(), Halt> {
        select! {
            send(tx, item) -> res => res.map_err(|_| Halt),
            recv(self.shutdown) -> _ => Err(Halt),
        }
    }
}
