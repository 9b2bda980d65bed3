//! Common utilities for integration tests

use std::time::Duration;
use watcher::{Event, PollWatcher, WatcherConfig};

/// How long to wait for something that should happen
pub const EXPECT: Duration = Duration::from_secs(3);

/// How long to wait to be reasonably sure nothing else arrives
pub const QUIET: Duration = Duration::from_millis(300);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Watcher ticking every 20ms
pub fn fast_watcher() -> PollWatcher {
    init_tracing();
    let config = WatcherConfig::default().with_poll_interval(Duration::from_millis(20));
    PollWatcher::with_config(config).expect("watcher should start")
}

pub fn next_event(watcher: &PollWatcher) -> Event {
    watcher
        .events()
        .recv_timeout(EXPECT)
        .expect("expected an event")
}

pub fn assert_quiet(watcher: &PollWatcher) {
    if let Ok(event) = watcher.events().recv_timeout(QUIET) {
        panic!("unexpected event: {}", event);
    }
}
